//! Sales-script prompt assembly for /natty.

use serde::Serialize;

use crate::llm_client::prompts::LAWN_PRO_PERSONA;
use crate::pricing::estimate::JobType;
use crate::sales::prompts::SCRIPT_PROMPT_TEMPLATE;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScriptTone {
    #[default]
    Friendly,
    Direct,
    Premium,
}

impl ScriptTone {
    /// Unknown or missing tones fall back to `Friendly`.
    pub fn parse_lenient(raw: Option<&str>) -> Self {
        match raw.map(|t| t.trim().to_lowercase()).as_deref() {
            Some("direct") => ScriptTone::Direct,
            Some("premium") => ScriptTone::Premium,
            _ => ScriptTone::Friendly,
        }
    }

    fn guidance(self) -> &'static str {
        match self {
            ScriptTone::Friendly => {
                "warm and neighborly; first names, light small talk, no jargon"
            }
            ScriptTone::Direct => {
                "brief and matter-of-fact; lead with what gets done and when"
            }
            ScriptTone::Premium => {
                "polished and detail-oriented; stress craftsmanship, reliability and a guaranteed finish"
            }
        }
    }
}

/// Inputs for one script.
#[derive(Debug, Clone)]
pub struct ScriptBrief<'a> {
    pub job_type: JobType,
    pub customer_name: Option<&'a str>,
    pub price: Option<u32>,
    pub notes: Option<&'a str>,
    pub tone: ScriptTone,
}

pub fn build_script_prompt(brief: &ScriptBrief<'_>) -> String {
    let customer = brief.customer_name.unwrap_or("the homeowner");
    let price_line = match brief.price {
        Some(price) => format!("Quoted price: ${price} (mention it once, plainly)"),
        None => "Quoted price: not decided yet (do not invent a number)".to_string(),
    };
    let notes_line = match brief.notes {
        Some(notes) => format!("Crew notes: {notes}"),
        None => "Crew notes: none".to_string(),
    };

    SCRIPT_PROMPT_TEMPLATE
        .replace("{persona}", LAWN_PRO_PERSONA)
        .replace("{job_type}", brief.job_type.as_str())
        .replace("{customer}", customer)
        .replace("{price_line}", &price_line)
        .replace("{notes_line}", &notes_line)
        .replace("{tone_guidance}", brief.tone.guidance())
}
