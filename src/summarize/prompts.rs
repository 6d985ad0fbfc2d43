/// Build a deterministic prompt for a bounded summary of transcript text.
pub fn build_bounded_summary_prompt(text: &str, max_length: usize, min_length: usize) -> String {
    format!(
        "You are an assistant that writes concise, factual summaries of meeting transcripts.\n\
\n\
Rules:\n\
- Write between {min_length} and {max_length} words.\n\
- Use only information present in the text.\n\
- Return plain prose with no headings, bullets, or preamble.\n\
\n\
Text:\n\
{text}"
    )
}
