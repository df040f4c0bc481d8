//! 提示词构造
//!
//! 每个批次请求都由固定的少样本示例、固定的格式规则和实际
//! 载荷拼成。示例覆盖了纯文本、特殊符号、行内标记和多行
//! 转义序列四类情况，规则则明确要求模型只翻译字面文本。

use crate::error::TranslateResult;

use super::TranslationRequest;

/// 少样本示例块
///
/// 输入/输出对的格式与实际载荷完全一致，模型照样输出 JSON。
const FEW_SHOT_EXAMPLES: &str = r##"input: {
  "source_language": "en",
  "target_language": "ko",
  "strings": [
    {"id": 1, "text": "Your document has been saved successfully."},
    {"id": 2, "text": "Please check your internet connection and try again."},
    {"id": 3, "text": "This feature is not available in the free version."}
  ]
}
output: {
  "translations": [
    {"id": 1, "text": "문서가 성공적으로 저장되었습니다."},
    {"id": 2, "text": "인터넷 연결을 확인하고 다시 시도하세요."},
    {"id": 3, "text": "이 기능은 무료 버전에서 사용할 수 없습니다."}
  ]
}

input: {
  "source_language": "en",
  "target_language": "fr",
  "strings": [
    {"id": 1, "text": "QR & Barcode Scanner"}
  ]
}
output: {
  "translations": [
    {"id": 1, "text": "Scanner de QR & code-barres"}
  ]
}

input: {
  "source_language": "en",
  "target_language": "ko",
  "strings": [
    {"id": 1, "text": "Don't forget to write tag #XpertScan"},
    {"id": 2, "text": "Can't find an app that supports this action"}
  ]
}
output: {
  "translations": [
    {"id": 1, "text": "#XpertScan 태그를 작성하는 것을 잊지 마세요"},
    {"id": 2, "text": "이 작업을 지원하는 앱을 찾을 수 없습니다"}
  ]
}

input: {
  "source_language": "en",
  "target_language": "zh",
  "strings": [
    {"id": 1, "text": "Export as PDF failed"},
    {"id": 2, "text": "Share as PDF failed"},
    {"id": 3, "text": "Export to gallery failed"},
    {"id": 4, "text": "Share as picture failed"},
    {"id": 5, "text": "Print PDF failed"},
    {"id": 6, "text": "Insert password"}
  ]
}
output: {
  "translations": [
    {"id": 1, "text": "导出为PDF失败"},
    {"id": 2, "text": "分享为PDF失败"},
    {"id": 3, "text": "导出到图库失败"},
    {"id": 4, "text": "分享为图片失败"},
    {"id": 5, "text": "打印PDF失败"},
    {"id": 6, "text": "请输入密码"}
  ]
}

input: {
  "source_language": "en",
  "target_language": "vi",
  "strings": [
    {"id": 1, "text": "Export as PDF failed"},
    {"id": 2, "text": "Share as PDF failed"},
    {"id": 3, "text": "Export to gallery failed"},
    {"id": 4, "text": "Share as picture failed"},
    {"id": 5, "text": "Print PDF failed"},
    {"id": 6, "text": "Insert password"}
  ]
}
output: {
  "translations": [
    {"id": 1, "text": "Xuất PDF thất bại"},
    {"id": 2, "text": "Chia sẻ dưới dạng PDF thất bại"},
    {"id": 3, "text": "Xuất vào thư viện thất bại"},
    {"id": 4, "text": "Chia sẻ dưới dạng hình ảnh thất bại"},
    {"id": 5, "text": "In PDF thất bại"},
    {"id": 6, "text": "Nhập mật khẩu"}
  ]
}

input: {
  "source_language": "en",
  "target_language": "it",
  "strings": [
    {"id": 1, "text": "Export as PDF failed"},
    {"id": 2, "text": "Share as PDF failed"},
    {"id": 3, "text": "Export to gallery failed"},
    {"id": 4, "text": "Share as picture failed"},
    {"id": 5, "text": "Print PDF failed"},
    {"id": 6, "text": "Insert password"}
  ]
}
output: {
  "translations": [
    {"id": 1, "text": "Esportazione come PDF fallita"},
    {"id": 2, "text": "Condivisione come PDF fallita"},
    {"id": 3, "text": "Esportazione nella galleria fallita"},
    {"id": 4, "text": "Condivisione come immagine fallita"},
    {"id": 5, "text": "Stampa PDF fallita"},
    {"id": 6, "text": "Inserisci la password"}
  ]
}

input: {
  "source_language": "en",
  "target_language": "vi",
  "strings": [
    {
      "id": 1,
      "text": "Enable <b>Notifications</b> for continuous using when the app is closed."
    }
  ]
}
output: {
  "translations": [
    {
      "id": 1,
      "text": "Bật <b>Thông báo</b> của ứng dụng để tiếp tục sử dụng khi ứng dụng bị đóng."
    }
  ]
}

input: {
  "source_language": "en",
  "target_language": "vi",
  "strings": [
    {
      "id": 1,
      "text": "Dear User,\n\nThank you for using our service.\r\nPlease note the following:\n\t- Your subscription expires soon.\n\t- Renew to continue enjoying premium features.\n\nBest regards,\nThe Support Team"
    },
    {
      "id": 2,
      "text": "Error!\r\n\tSomething went wrong while processing your request.\nPlease try again later or contact support."
    }
  ]
}
output: {
  "translations": [
    {
      "id": 1,
      "text": "Kính gửi người dùng,\n\nCảm ơn bạn đã sử dụng dịch vụ của chúng tôi.\r\nVui lòng lưu ý:\n\t- Gói đăng ký của bạn sắp hết hạn.\n\t- Gia hạn để tiếp tục tận hưởng các tính năng cao cấp.\n\nTrân trọng,\nĐội ngũ Hỗ trợ"
    },
    {
      "id": 2,
      "text": "Lỗi!\r\n\tĐã xảy ra sự cố khi xử lý yêu cầu của bạn.\nVui lòng thử lại sau hoặc liên hệ bộ phận hỗ trợ."
    }
  ]
}

input: {
  "source_language": "en",
  "target_language": "vi",
  "strings": [
    {
      "id": 1,
      "text": "Set app <font color="#FF3E3E"><b>PDF Reader</b></font> as the default PDF reader"
    },
    {
      "id": 2,
      "text": "Click <font color="#007AFF"><b>Allow</b></font> to enable permissions"
    }
  ]
}
output: {
  "translations": [
    {
      "id": 1,
      "text": "Đặt ứng dụng <font color="#FF3E3E"><b>PDF Reader</b></font> làm trình đọc PDF mặc định"
    },
    {
      "id": 2,
      "text": "Nhấn <font color="#007AFF"><b>Cho phép</b></font> để bật quyền"
    }
  ]
}

input: {
  "source_language": "en",
  "target_language": "ko",
  "strings": [
    {
      "id": 1,
      "text": "Download <font color="#34C759"><b>Premium</b></font> version for unlimited features"
    },
    {
      "id": 2,
      "text": "Status: <font color="#FF9500"><b>Processing...</b></font>"
    }
  ]
}
output: {
  "translations": [
    {
      "id": 1,
      "text": "<font color="#34C759"><b>프리미엄</b></font> 버전을 다운로드하여 무제한 기능을 이용하세요"
    },
    {
      "id": 2,
      "text": "상태: <font color="#FF9500"><b>처리 중...</b></font>"
    }
  ]
}"##;

/// 固定的格式规则
const FORMAT_RULES: &str = r##"IMPORTANT FORMATTING RULES:
1. Always preserve HTML/XML tags exactly as they appear: <b>, </b>, <font>, </font>, etc.
2. Keep all HTML attributes unchanged: color="#FF3E3E", style="...", etc.
3. Only translate the actual text content, not the HTML structure
4. Preserve all escape sequences: \n, \r, \t, \\, etc.
5. Keep special characters and symbols: #, @, &, etc.
6. Respond with JSON only, no surrounding prose"##;

/// 拼装一个批次的完整提示词
pub fn build_prompt(request: &TranslationRequest) -> TranslateResult<String> {
    let request_json = serde_json::to_string(request)?;

    Ok(format!(
        "{FEW_SHOT_EXAMPLES}\n\n{FORMAT_RULES}\n\ninput: {request_json}\noutput:"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_contains_examples_rules_and_payload() {
        let request = TranslationRequest::from_pairs(
            "en",
            "vi",
            &[("greeting".to_string(), "Hello".to_string())],
        );

        let prompt = build_prompt(&request).unwrap();

        assert!(prompt.contains("QR & Barcode Scanner"), "few-shot block missing");
        assert!(prompt.contains("IMPORTANT FORMATTING RULES"), "rules missing");
        assert!(prompt.contains("\"target_language\":\"vi\""), "payload missing");
        assert!(prompt.trim_end().ends_with("output:"));
    }

    #[test]
    fn payload_is_serialized_after_the_examples() {
        let request = TranslationRequest::from_pairs(
            "en",
            "ja",
            &[("k".to_string(), "Value".to_string())],
        );

        let prompt = build_prompt(&request).unwrap();
        let payload_pos = prompt.rfind("input:").unwrap();
        let rules_pos = prompt.find("IMPORTANT FORMATTING RULES").unwrap();

        assert!(rules_pos < payload_pos, "real payload must come last");
    }
}
