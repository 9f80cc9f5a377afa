//! Motivational quotes for the home screen card.

use chrono::{Datelike, NaiveDate};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotivationalQuote {
    pub text: &'static str,
    /// Empty when the author is unknown.
    pub author: &'static str,
}

const QUOTES: &[MotivationalQuote] = &[
    MotivationalQuote {
        text: "Success is the sum of small efforts, repeated day in and day out.",
        author: "Robert Collier",
    },
    MotivationalQuote {
        text: "You are stronger than you think.",
        author: "",
    },
    MotivationalQuote {
        text: "Every day is a new chance to become a better version of yourself.",
        author: "",
    },
    MotivationalQuote {
        text: "Don't count the days, make the days count.",
        author: "Muhammad Ali",
    },
    MotivationalQuote {
        text: "Habits shape character, and character shapes destiny.",
        author: "",
    },
    MotivationalQuote {
        text: "Motivation is what gets you started. Habit is what keeps you going.",
        author: "Jim Ryun",
    },
    MotivationalQuote {
        text: "The only way to do great work is to love what you do.",
        author: "Steve Jobs",
    },
    MotivationalQuote {
        text: "Don't wait for the perfect moment. Take the moment and make it perfect.",
        author: "",
    },
    MotivationalQuote {
        text: "Change is hard at first, messy in the middle and gorgeous at the end.",
        author: "Robin Sharma",
    },
    MotivationalQuote {
        text: "21 days build a habit, 90 days build a lifestyle.",
        author: "",
    },
];

/// Picks the quote shown on `date`; stable for the whole day.
pub fn quote_for_day(date: NaiveDate) -> MotivationalQuote {
    let index = date.ordinal0() as usize % QUOTES.len();
    QUOTES[index]
}
