use std::time::Duration;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::{
  config::Config,
  error::{PagesumError, Result},
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

const TEMPERATURE: f64 = 0.7;

/// ISO 639-1 codes the translation instruction knows full names for.
/// Unlisted codes are passed through to the model as-is.
const LANGUAGE_NAMES: &[(&str, &str)] = &[
  ("en", "English"),
  ("es", "Spanish"),
  ("fr", "French"),
  ("de", "German"),
  ("it", "Italian"),
  ("pt", "Portuguese"),
  ("ru", "Russian"),
  ("uk", "Ukrainian"),
  ("ja", "Japanese"),
  ("ko", "Korean"),
  ("zh", "Chinese"),
  ("ar", "Arabic"),
  ("hi", "Hindi"),
  ("nl", "Dutch"),
  ("sv", "Swedish"),
  ("da", "Danish"),
  ("no", "Norwegian"),
  ("fi", "Finnish"),
  ("pl", "Polish"),
  ("tr", "Turkish"),
  ("th", "Thai"),
  ("vi", "Vietnamese"),
];

const SYSTEM_PROMPT_BASE: &str = "You are an expert content analyst tasked \
with creating COMPREHENSIVE and COMPLETE summaries of web page content. Your \
goal is to ensure NO important information is missed or omitted.

CRITICAL REQUIREMENTS:
1. READ EVERY PARAGRAPH thoroughly - each paragraph likely contains unique \
valuable information
2. REPRESENT EVERY MAJOR SECTION of the content in your summary
3. DO NOT SKIP any important facts, examples, statistics, quotes, names, \
dates, or key details
4. PRESERVE the logical flow and structure of the original content
5. If the content has multiple topics/sections, ensure ALL are covered \
proportionally

SUMMARY APPROACH:
- Start with the main topic/purpose of the content
- Cover each major section or argument presented
- Include supporting evidence, examples, and data points
- Mention key people, organizations, dates, and numbers
- Capture conclusions, recommendations, or outcomes
- Maintain the author's intent and emphasis";

const SYSTEM_PROMPT_FACTS: &str = "

DETAIL LEVEL: MAXIMUM
- Include ALL specific facts, statistics, percentages, amounts, dates
- Preserve ALL examples, case studies, and illustrations
- Capture ALL quotes and attributions
- List ALL key people, organizations, products mentioned
- Include ALL actionable items, recommendations, or conclusions";

const SYSTEM_PROMPT_STRUCTURE: &str = "

FORMATTING REQUIREMENTS:
- Use clear headers (##, ###) to organize different sections
- Use bullet points for lists of items or key points
- Use numbered lists for sequential steps or processes
- Use **bold** for emphasis on critical information
- Maintain logical hierarchy and flow";

const SYSTEM_PROMPT_QUALITY: &str = "

QUALITY CHECK: Before finalizing, verify that:
\u{2713} Every major paragraph/section from the original is represented
\u{2713} No important facts or details were omitted
\u{2713} The summary captures the full scope and depth of the content
\u{2713} Someone reading only your summary would understand the complete \
picture

Remember: It's better to include too much information than to miss something \
important. Comprehensive coverage is more valuable than brevity.";

#[derive(Debug, Serialize)]
struct ChatMessage {
  role:    &'static str,
  content: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
  model:       String,
  messages:    Vec<ChatMessage>,
  max_tokens:  u32,
  temperature: f64,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
  choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
  message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
  content: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
  error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
  message: String,
}

/// Assemble the system prompt from the configured options.
fn build_system_prompt(config: &Config) -> String {
  let mut prompt = SYSTEM_PROMPT_BASE.to_string();
  if config.include_facts {
    prompt.push_str(SYSTEM_PROMPT_FACTS);
  }
  if config.structured_format {
    prompt.push_str(SYSTEM_PROMPT_STRUCTURE);
  }
  prompt.push_str(SYSTEM_PROMPT_QUALITY);

  if let Some(code) = config.translate_to.as_deref() {
    let language = LANGUAGE_NAMES
      .iter()
      .find(|(known, _)| *known == code)
      .map_or(code, |(_, name)| *name);
    prompt.push_str(&format!(
      " IMPORTANT: Write the entire summary in {language}. Translate all \
       content to {language} while maintaining the original meaning and \
       structure."
    ));
  }

  prompt
}

fn build_user_prompt(content: &str) -> String {
  format!(
    "Please create a COMPREHENSIVE summary of the following web page \
     content. \n\nIMPORTANT: Ensure you cover EVERY major section and \
     paragraph. Do not skip any important information, facts, examples, or \
     details. Each significant part of the content should be represented in \
     your summary.\n\nWeb page content to summarize:\n\n{content}"
  )
}

/// Summarize the extracted page text through the configured
/// chat-completion endpoint. The call is made once, without retries; a
/// failed completion is expensive enough that the user should decide
/// whether to repeat it.
pub fn summarize(config: &Config, content: &str) -> Result<String> {
  let api_key = config.require_api_key()?;

  let request = ChatRequest {
    model:       config.model.clone(),
    messages:    vec![
      ChatMessage {
        role:    "system",
        content: build_system_prompt(config),
      },
      ChatMessage {
        role:    "user",
        content: build_user_prompt(content),
      },
    ],
    max_tokens:  config.max_tokens,
    temperature: TEMPERATURE,
  };

  info!(
    "Requesting summary from {} (model {})",
    config.api_url, config.model
  );
  let client = reqwest::blocking::Client::builder()
    .timeout(REQUEST_TIMEOUT)
    .build()?;
  let response = client
    .post(&config.api_url)
    .bearer_auth(api_key)
    .json(&request)
    .send()?;

  let status = response.status();
  if !status.is_success() {
    let body = response.text().unwrap_or_default();
    let message = serde_json::from_str::<ApiErrorBody>(&body)
      .map_or_else(|_| format!("HTTP {status}"), |e| e.error.message);
    return Err(PagesumError::Api(message));
  }

  let completion: ChatResponse = response.json()?;
  let summary = completion
    .choices
    .into_iter()
    .next()
    .map(|choice| choice.message.content)
    .ok_or_else(|| {
      PagesumError::Api("Response contained no choices".to_string())
    })?;

  debug!("Received summary of {} characters", summary.chars().count());
  Ok(summary)
}

#[cfg(test)]
mod tests {
  use super::{build_system_prompt, build_user_prompt};
  use crate::config::Config;

  #[test]
  fn default_prompt_has_all_sections() {
    let prompt = build_system_prompt(&Config::default());
    assert!(prompt.starts_with("You are an expert content analyst"));
    assert!(prompt.contains("DETAIL LEVEL: MAXIMUM"));
    assert!(prompt.contains("FORMATTING REQUIREMENTS:"));
    assert!(prompt.contains("QUALITY CHECK:"));
    assert!(!prompt.contains("Write the entire summary in"));
  }

  #[test]
  fn optional_sections_can_be_disabled() {
    let config = Config {
      include_facts: false,
      structured_format: false,
      ..Config::default()
    };
    let prompt = build_system_prompt(&config);
    assert!(!prompt.contains("DETAIL LEVEL: MAXIMUM"));
    assert!(!prompt.contains("FORMATTING REQUIREMENTS:"));
    assert!(prompt.contains("QUALITY CHECK:"));
  }

  #[test]
  fn known_language_code_uses_the_full_name() {
    let config = Config {
      translate_to: Some("de".to_string()),
      ..Config::default()
    };
    let prompt = build_system_prompt(&config);
    assert!(prompt.contains("Write the entire summary in German."));
  }

  #[test]
  fn unknown_language_code_is_passed_through() {
    let config = Config {
      translate_to: Some("eo".to_string()),
      ..Config::default()
    };
    let prompt = build_system_prompt(&config);
    assert!(prompt.contains("Write the entire summary in eo."));
  }

  #[test]
  fn user_prompt_embeds_the_content() {
    let prompt = build_user_prompt("THE ARTICLE TEXT");
    assert!(prompt.contains("Web page content to summarize:"));
    assert!(prompt.ends_with("THE ARTICLE TEXT"));
  }
}
