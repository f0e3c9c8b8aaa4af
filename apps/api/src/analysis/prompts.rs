// LLM prompt constants for the analysis module.
// Reuses cross-cutting fragments from llm_client::prompts.

use crate::analysis::models::AnalysisRequest;
use crate::llm_client::prompts::JSON_ONLY_RULE;

/// Skill comparison prompt template.
/// Replace: {json_only_rule}, {resume_text}, {job_posting}
pub const ANALYSIS_PROMPT_TEMPLATE: &str = r#"You are a resume analyzer. Compare the resume with the job posting.

Resume: {resume_text}
Job Posting: {job_posting}

Rules:
1. {json_only_rule}
2. JSON must follow this schema:
{
  "hard_skills_resume": [],
  "hard_skills_job": [],
  "soft_skills_resume": [],
  "soft_skills_job": [],
  "matched": [],
  "missing": [],
  "fit_score": 0
}
3. When identifying skills:
   - Extract explicit hard/soft skills listed directly in the text.
   - Infer additional skills from job descriptions, responsibilities, and context.
4. When comparing:
   - If a skill is an exact match (e.g., "Python" vs "Python"), list it once (e.g., "Python").
   - If two skills are close synonyms, use "≈" notation (e.g., "teamwork ≈ collaborative attitude").
   - If two skills are conceptually similar but worded differently, also use "≈".
   - Never return "x ≈ x". If both sides are the same, return just "x".
5. "fit_score" must be an integer percentage between 0 and 100, calculated as:
   (number of matched skills ÷ total number of job skills) × 100

Examples:
- Resume: ["supportive communication"], Job: ["communication"]
  Matched: ["supportive communication ≈ communication"]

- Resume: ["leadership"], Job: ["collaboration"]
  Matched: ["leadership ≈ collaboration"]

- Resume: ["critical thinking"], Job: ["problem-solving"]
  Matched: ["critical thinking ≈ problem-solving"]"#;

/// Fills the template. The resume is substituted last so text inside it that
/// happens to look like a placeholder is left alone.
pub fn build_analysis_prompt(request: &AnalysisRequest) -> String {
    ANALYSIS_PROMPT_TEMPLATE
        .replace("{json_only_rule}", JSON_ONLY_RULE)
        .replace("{job_posting}", &request.job_posting)
        .replace("{resume_text}", &request.resume_text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_embeds_both_texts() {
        let request = AnalysisRequest::new("Rust  developer", "Needs\nRust");
        let prompt = build_analysis_prompt(&request);
        assert!(prompt.contains("Resume: Rust developer"));
        assert!(prompt.contains("Job Posting: Needs Rust"));
        assert!(prompt.contains(JSON_ONLY_RULE));
        assert!(!prompt.contains("{resume_text}"));
    }

    #[test]
    fn test_prompt_leaves_placeholder_lookalikes_in_resume() {
        let request = AnalysisRequest::new("I write {job_posting} parsers", "Rust");
        let prompt = build_analysis_prompt(&request);
        assert!(prompt.contains("Resume: I write {job_posting} parsers"));
        assert!(prompt.contains("Job Posting: Rust"));
    }
}
