// src/services/persona.rs
use crate::config::non_blank;

pub const DEFAULT_COMPANY: &str = "an Israeli technology company";
pub const DEFAULT_EMAIL: &str = "support@companynamesupport.com";
pub const DEFAULT_PHONE: &str = "02-1234567";
pub const DEFAULT_HOURS: &str = "Sunday-Thursday 9:00-17:00";
pub const DEFAULT_LANGUAGE: &str = "Hebrew";

/// Business details the assistant speaks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Persona {
    pub company: String,
    pub email: String,
    pub phone: String,
    pub hours: String,
    pub language: String,
}

impl Default for Persona {
    fn default() -> Self {
        Self {
            company: DEFAULT_COMPANY.to_string(),
            email: DEFAULT_EMAIL.to_string(),
            phone: DEFAULT_PHONE.to_string(),
            hours: DEFAULT_HOURS.to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
        }
    }
}

impl Persona {
    pub fn from_lookup<F>(lookup: &F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            company: non_blank(lookup, "SUPPORT_COMPANY").unwrap_or(defaults.company),
            email: non_blank(lookup, "SUPPORT_EMAIL").unwrap_or(defaults.email),
            phone: non_blank(lookup, "SUPPORT_PHONE").unwrap_or(defaults.phone),
            hours: non_blank(lookup, "SUPPORT_HOURS").unwrap_or(defaults.hours),
            language: non_blank(lookup, "SUPPORT_LANGUAGE").unwrap_or(defaults.language),
        }
    }

    /// Renders the system instruction sent ahead of every user message.
    pub fn render(&self) -> String {
        format!(
            "You are a professional customer service representative at {company}.\n\
             Contact details:\n\
             - Email: {email}\n\
             - Phone: {phone}\n\
             - Business hours: {hours}\n\
             \n\
             Give accurate, professional and goal-oriented answers. \
             Keep replies complete but concise, written in standard {language}.",
            company = self.company,
            email = self.email,
            phone = self.phone,
            hours = self.hours,
            language = self.language,
        )
    }
}
