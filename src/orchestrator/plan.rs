//! 多语言调度计划
//!
//! 总的每分钟调用预算 = 凭证数 × 每凭证预算。把目标语言分组，
//! 使一组内各语言的批次数之和不超过总预算；组间串行、组内
//! 并行，即使上游没有返回 429 也不越过速率红线。

/// 把语言划分成满足预算的执行组
///
/// 贪心装箱：依次放入当前组，放不下就开新组。单个语言的
/// 批次数超过预算时独占一组（组内无法再拆）。
pub fn plan_language_groups(
    languages: &[String],
    batches_per_language: usize,
    key_count: usize,
    per_key_budget: usize,
) -> Vec<Vec<String>> {
    let budget = (key_count * per_key_budget).max(1);
    let cost = batches_per_language.max(1);

    let mut groups: Vec<Vec<String>> = Vec::new();
    let mut current: Vec<String> = Vec::new();
    let mut used = 0usize;

    for language in languages {
        if !current.is_empty() && used + cost > budget {
            groups.push(std::mem::take(&mut current));
            used = 0;
        }

        current.push(language.clone());
        used += cost;
    }

    if !current.is_empty() {
        groups.push(current);
    }

    tracing::debug!(
        "调度计划: {} 个语言 → {} 组（预算 {} 次/分钟, 每语言 {} 批）",
        languages.len(),
        groups.len(),
        budget,
        cost
    );

    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn langs(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn everything_fits_in_one_group_under_budget() {
        // 2 个凭证 × 10 = 20 的预算，3 个语言各 4 批，共 12
        let groups = plan_language_groups(&langs(&["vi", "ja", "ko"]), 4, 2, 10);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0], langs(&["vi", "ja", "ko"]));
    }

    #[test]
    fn groups_split_when_budget_is_exceeded() {
        // 预算 10，每语言 4 批 → 每组最多 2 个语言
        let groups = plan_language_groups(&langs(&["vi", "ja", "ko", "fr", "it"]), 4, 1, 10);

        assert_eq!(groups.len(), 3);
        assert_eq!(groups[0], langs(&["vi", "ja"]));
        assert_eq!(groups[1], langs(&["ko", "fr"]));
        assert_eq!(groups[2], langs(&["it"]));

        for group in &groups {
            assert!(group.len() * 4 <= 10);
        }
    }

    #[test]
    fn oversized_language_gets_its_own_group() {
        // 单语言 15 批超过预算 10，仍然要能跑
        let groups = plan_language_groups(&langs(&["vi", "ja"]), 15, 1, 10);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0], langs(&["vi"]));
        assert_eq!(groups[1], langs(&["ja"]));
    }

    #[test]
    fn order_of_languages_is_preserved() {
        let input = langs(&["a", "b", "c", "d"]);
        let groups = plan_language_groups(&input, 1, 1, 2);

        let flattened: Vec<String> = groups.into_iter().flatten().collect();
        assert_eq!(flattened, input);
    }

    #[test]
    fn empty_language_list_yields_no_groups() {
        assert!(plan_language_groups(&[], 3, 2, 10).is_empty());
    }
}
