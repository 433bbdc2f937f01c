//! # I18n Unit Tests / I18n 单元测试
//!
//! Locale resolution and a sample of translated report strings.
//! 语言区域解析以及部分报告字符串翻译的测试。

use share_consistency::models::Outcome;
use share_consistency::reporting::console::kind_label;
use share_consistency::resolve_locale;

#[cfg(test)]
mod resolve_locale_tests {
    use super::*;

    #[test]
    fn test_exact_locale_is_kept() {
        assert_eq!(resolve_locale("en"), "en");
        assert_eq!(resolve_locale("zh-CN"), "zh-CN");
    }

    #[test]
    fn test_underscore_and_case_variants_resolve() {
        assert_eq!(resolve_locale("zh_CN"), "zh-CN");
        assert_eq!(resolve_locale("zh-cn"), "zh-CN");
    }

    #[test]
    fn test_language_code_matches_region_variant() {
        assert_eq!(resolve_locale("en-US"), "en");
        assert_eq!(resolve_locale("zh-TW"), "zh-CN");
    }

    #[test]
    fn test_unknown_language_falls_back_to_english() {
        assert_eq!(resolve_locale("invalid-lang"), "en");
        assert_eq!(resolve_locale(""), "en");
    }
}

#[cfg(test)]
mod translation_tests {
    use super::*;

    #[test]
    fn test_kind_labels_are_translated() {
        assert_eq!(kind_label("mutual_follow", "en"), "mutual follow");
        assert_eq!(kind_label("mutual_follow", "zh-CN"), "互相关注");
    }

    #[test]
    fn test_unknown_kind_label_is_passed_through() {
        assert_eq!(kind_label("custom_probe", "en"), "custom_probe");
    }

    #[test]
    fn test_status_labels_follow_locale() {
        let warn = Outcome::warn("incomplete");
        assert_eq!(warn.status_str("en"), "WARN");
        assert_eq!(warn.status_str("zh-CN"), "警告");
    }
}
