//! # Feature: Sentiment Classification
//!
//! Maps free text to a [`Feeling`] with an ordered keyword rule table. The
//! first rule with any keyword present (case-insensitive substring) wins, so
//! the order of [`RULES`] is part of the behavior.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feeling {
    Happy,
    Excited,
    Sad,
    Thinking,
    Serious,
    Greeting,
    Grateful,
    Cute,
    Approved,
    Wtf,
    Angry,
    Bye,
    Coffee,
    Childish,
    Debate,
}

impl Feeling {
    pub const ALL: [Feeling; 15] = [
        Feeling::Happy,
        Feeling::Excited,
        Feeling::Sad,
        Feeling::Thinking,
        Feeling::Serious,
        Feeling::Greeting,
        Feeling::Grateful,
        Feeling::Cute,
        Feeling::Approved,
        Feeling::Wtf,
        Feeling::Angry,
        Feeling::Bye,
        Feeling::Coffee,
        Feeling::Childish,
        Feeling::Debate,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Feeling::Happy => "happy",
            Feeling::Excited => "excited",
            Feeling::Sad => "sad",
            Feeling::Thinking => "thinking",
            Feeling::Serious => "serious",
            Feeling::Greeting => "greeting",
            Feeling::Grateful => "grateful",
            Feeling::Cute => "cute",
            Feeling::Approved => "approved",
            Feeling::Wtf => "wtf",
            Feeling::Angry => "angry",
            Feeling::Bye => "bye",
            Feeling::Coffee => "coffee",
            Feeling::Childish => "childish",
            Feeling::Debate => "debate",
        }
    }
}

impl fmt::Display for Feeling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the classification table.
#[derive(Debug, Clone, Copy)]
pub struct SentimentRule {
    pub feeling: Feeling,
    pub keywords: &'static [&'static str],
}

impl SentimentRule {
    /// `lowercase_text` must already be lowercased.
    pub fn matches(&self, lowercase_text: &str) -> bool {
        self.keywords.iter().any(|keyword| lowercase_text.contains(keyword))
    }
}

/// Evaluated top to bottom. Greetings sit above the question catch-all so
/// "hello, can you help?" reads as a greeting.
pub const RULES: &[SentimentRule] = &[
    SentimentRule {
        feeling: Feeling::Grateful,
        keywords: &["thank", "thx", "appreciate", "grateful"],
    },
    SentimentRule {
        feeling: Feeling::Greeting,
        keywords: &["hello", "hey", "hii", "namaste", "good morning", "good evening", "greetings"],
    },
    SentimentRule {
        feeling: Feeling::Bye,
        keywords: &["bye", "see you", "good night", "take care"],
    },
    SentimentRule {
        feeling: Feeling::Angry,
        keywords: &["angry", "hate", "annoyed", "furious", "stupid"],
    },
    SentimentRule {
        feeling: Feeling::Sad,
        keywords: &["sad", "depressed", "unhappy", "cry", "lonely", "upset"],
    },
    SentimentRule {
        feeling: Feeling::Wtf,
        keywords: &["wtf", "what the", "weird", "strange"],
    },
    SentimentRule {
        feeling: Feeling::Coffee,
        keywords: &["coffee", "caffeine", "espresso", "tired", "sleepy"],
    },
    SentimentRule {
        feeling: Feeling::Excited,
        keywords: &["wow", "amazing", "awesome", "excited", "can't wait", "omg"],
    },
    SentimentRule {
        feeling: Feeling::Happy,
        keywords: &["happy", "great", "nice", "haha", "lol", "yay"],
    },
    SentimentRule {
        feeling: Feeling::Cute,
        keywords: &["cute", "adorable", "aww", "sweet", "love"],
    },
    SentimentRule {
        feeling: Feeling::Approved,
        keywords: &["okay", "sure", "agreed", "correct", "exactly", "approve"],
    },
    SentimentRule {
        feeling: Feeling::Childish,
        keywords: &["lmao", "silly", "childish", "baby"],
    },
    SentimentRule {
        feeling: Feeling::Debate,
        keywords: &["debate", "argue", "opinion", "versus", "better than"],
    },
    SentimentRule {
        feeling: Feeling::Serious,
        keywords: &["serious", "important", "urgent", "career", "job"],
    },
    SentimentRule {
        feeling: Feeling::Thinking,
        keywords: &["?", "how", "why", "think", "help", "explain"],
    },
];

/// Returns the feeling of the first matching rule, or `None` when the text is
/// unclassified.
pub fn classify(text: &str) -> Option<Feeling> {
    classify_with(RULES, text)
}

pub fn classify_with(rules: &[SentimentRule], text: &str) -> Option<Feeling> {
    let lowercase_text = text.to_lowercase();
    rules
        .iter()
        .find(|rule| rule.matches(&lowercase_text))
        .map(|rule| rule.feeling)
}
