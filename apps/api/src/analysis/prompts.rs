// Prompt template for resume analysis.

/// Fixed instructions sent ahead of the resume and job description. The section counts are
/// requests to the model; nothing downstream checks that it complied.
pub const ANALYSIS_INSTRUCTIONS: &str = r#"Analyze the RESUME based on the JOB DESCRIPTION.
Provide a "fit score" from 1 to 100.
List 3 "missing skills" from the job description not found in the resume.
Generate 2 "tailored bullet points" for the resume to better match the job description."#;

/// Builds the analysis prompt. Both inputs are embedded verbatim and in a single pass, so
/// brace-delimited text inside a resume is never treated as a placeholder.
pub fn build_prompt(resume_text: &str, job_description: &str) -> String {
    format!(
        "{ANALYSIS_INSTRUCTIONS}\n\nRESUME:\n{resume_text}\n\nJOB DESCRIPTION:\n{job_description}\n"
    )
}
