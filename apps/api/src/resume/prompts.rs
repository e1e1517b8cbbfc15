use crate::engine::prompts::fill_template;

/// Resume analysis prompt. Replace `{company}` and `{position}` before sending.
///
/// Values are interpolated verbatim; the consumer is a language model.
pub const ANALYSIS_PROMPT_TEMPLATE: &str = r#"I am a job seeker applying for the {position} position at {company}.
Based on the content of my resume, please analyze it from the following aspects:
1. My main strengths and highlights
2. How well I match the requirements of the position
3. Weaknesses and areas for improvement
4. Suggestions for revising my resume
5. Suggestions for interview preparation

Please give a detailed analysis with concrete suggestions."#;

pub fn build_analysis_prompt(company: &str, position: &str) -> String {
    fill_template(
        ANALYSIS_PROMPT_TEMPLATE,
        &[("company", company), ("position", position)],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_company_and_position_interpolated() {
        let prompt = build_analysis_prompt("Acme Corp", "Staff Engineer");
        assert!(prompt.contains("the Staff Engineer position at Acme Corp"));
        assert!(!prompt.contains("{company}"));
        assert!(!prompt.contains("{position}"));
    }

    #[test]
    fn test_all_five_dimensions_requested() {
        let prompt = build_analysis_prompt("A", "B");
        for n in 1..=5 {
            assert!(prompt.contains(&format!("{n}. ")));
        }
        assert!(prompt.contains("interview preparation"));
    }

    #[test]
    fn test_values_are_not_escaped() {
        let prompt = build_analysis_prompt("<Acme & \"Sons\">", "Dev\nOps");
        assert!(prompt.contains("<Acme & \"Sons\">"));
        assert!(prompt.contains("Dev\nOps"));
    }

    #[test]
    fn test_placeholder_text_in_values_is_kept_literally() {
        let prompt = build_analysis_prompt("{position} Labs", "Engineer");
        assert!(prompt.contains("the Engineer position at {position} Labs."));

        let prompt = build_analysis_prompt("Acme", "{company} liaison");
        assert!(prompt.contains("the {company} liaison position at Acme."));
    }
}
