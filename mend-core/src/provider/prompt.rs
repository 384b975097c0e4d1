//! Prompt construction and response post-processing
//!
//! Every backend receives the same single-turn prompt: the goal, the file
//! path, the inferred language, and the full original content fenced as a
//! code block, with instructions to return only replacement code.

use super::SuggestionRequest;

/// Build the improvement prompt for one file
pub fn build_prompt(request: &SuggestionRequest<'_>) -> String {
    let extension =
        request.file_path.extension().and_then(|e| e.to_str()).unwrap_or_default();

    format!(
        "You are an expert code reviewer and refactoring assistant.\n\n\
         TASK: {goal}\n\n\
         FILE: {path}\n\
         LANGUAGE: {ext}\n\n\
         ORIGINAL CODE:\n\
         ```{ext}\n\
         {content}\n\
         ```\n\n\
         INSTRUCTIONS:\n\
         1. Analyze the code and provide improvements based on the goal: \"{goal}\"\n\
         2. Return ONLY the improved code, no explanations or markdown formatting\n\
         3. Maintain the same functionality while improving the code\n\
         4. If the code is already optimal, return the original code unchanged\n\
         5. Ensure the code is syntactically correct and follows best practices\n\n\
         IMPROVED CODE:",
        goal = request.goal,
        path = request.file_path.display(),
        ext = extension,
        content = request.content,
    )
}

/// Strip Markdown fence delimiter lines and trim; `None` when nothing
/// usable remains.
pub fn extract_code(response: &str) -> Option<String> {
    let kept: Vec<&str> =
        response.lines().filter(|line| !line.trim().starts_with("```")).collect();

    let result = kept.join("\n").trim().to_string();
    if result.is_empty() { None } else { Some(result) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn prompt_embeds_goal_path_and_content() {
        let request = SuggestionRequest {
            content: "def f(): pass",
            goal: "add docstring",
            file_path: Path::new("src/app.py"),
        };
        let prompt = build_prompt(&request);

        assert!(prompt.contains("TASK: add docstring"));
        assert!(prompt.contains("FILE: src/app.py"));
        assert!(prompt.contains("LANGUAGE: py"));
        assert!(prompt.contains("```py\ndef f(): pass\n```"));
    }

    #[test]
    fn extract_code_strips_fences() {
        let response = "```python\ndef f(): pass\n```";
        assert_eq!(extract_code(response).unwrap(), "def f(): pass");
    }

    #[test]
    fn extract_code_keeps_unfenced_text() {
        assert_eq!(extract_code("fn main() {}\n").unwrap(), "fn main() {}");
    }

    #[test]
    fn extract_code_rejects_empty_responses() {
        assert!(extract_code("").is_none());
        assert!(extract_code("```\n```").is_none());
        assert!(extract_code("   \n  ").is_none());
    }

    #[test]
    fn extract_code_handles_indented_fences() {
        let response = "  ```rust\nlet x = 1;\n  ```";
        assert_eq!(extract_code(response).unwrap(), "let x = 1;");
    }
}
