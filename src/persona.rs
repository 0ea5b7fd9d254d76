use crate::reference_info::ReferenceInfo;

/// Lowercase names and phrases that mark a message as being about the subject.
pub const SUBJECT_KEYWORDS: &[&str] = &[
    "sai",
    "sai mahendra",
    "who is sai",
    "about sai",
    "tell me about sai",
    "bejawada sai mahendra",
    "mahendra",
];

/// Canned request used by the bio command instead of the user's text.
pub const ABOUT_SUBJECT_REQUEST: &str =
    "Tell me about Sai Mahendra, the programmer. Be cute and expressive but don't use emojis.";

#[derive(Debug, Clone)]
pub struct Persona {
    pub system_instruction: String,
}

impl Persona {
    /// The assistant that speaks about Sai, grounded in `info`.
    pub fn sai(info: &ReferenceInfo) -> Self {
        let system_instruction = format!(
            "You are a cute and expressive assistant without emojis.\n\
             When asked about Sai or Sai Mahendra, reply warmly, playfully, and based on: {}\n\
             Keep answers under 3 lines, concise and friendly.\n\
             Always be helpful, engaging, and respond in multiple languages when possible.",
            info.text()
        );

        Persona { system_instruction }
    }
}

/// Turns user text into the full model input. Built once at startup.
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    persona: Persona,
    subject_keywords: Vec<&'static str>,
}

impl PromptBuilder {
    pub fn new(persona: Persona) -> Self {
        PromptBuilder {
            persona,
            subject_keywords: SUBJECT_KEYWORDS.to_vec(),
        }
    }

    pub fn persona(&self) -> &Persona {
        &self.persona
    }

    pub fn is_about_subject(&self, text: &str) -> bool {
        let lowercase_text = text.to_lowercase();
        self.subject_keywords
            .iter()
            .any(|keyword| lowercase_text.contains(keyword))
    }

    pub fn build_prompt(&self, user_text: &str) -> String {
        if self.is_about_subject(user_text) {
            format!(
                "The user is asking about Sai: '{}'. {}",
                user_text, self.persona.system_instruction
            )
        } else {
            format!(
                "{}\n\nUser message: {}",
                self.persona.system_instruction, user_text
            )
        }
    }
}
