use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Topic a note is filed under.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Ideas and creative thoughts.
    Ideas,
    /// Shopping lists and errands.
    Shopping,
    /// Work-related notes.
    Work,
    /// Tasks and reminders.
    Tasks,
    /// Goals and aspirations.
    Goals,
    /// Everything else.
    #[default]
    Random,
}

/// Static presentation data for a [`Category`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryInfo {
    pub category: Category,
    pub name: &'static str,
    pub emoji: &'static str,
    /// Colour token used by front ends that style categories.
    pub color: &'static str,
    pub keywords: &'static [&'static str],
    pub description: &'static str,
}

const CATEGORIES: [CategoryInfo; 6] = [
    CategoryInfo {
        category: Category::Ideas,
        name: "Ideas & Thoughts",
        emoji: "🧠",
        color: "purple",
        keywords: &[
            "idea",
            "think",
            "concept",
            "maybe",
            "what if",
            "brainstorm",
            "creative",
        ],
        description: "Brilliant ideas and creative thoughts",
    },
    CategoryInfo {
        category: Category::Shopping,
        name: "Shopping & Errands",
        emoji: "🛒",
        color: "green",
        keywords: &["buy", "store", "grocery", "pickup", "need", "shop", "market"],
        description: "Shopping lists and errands to run",
    },
    CategoryInfo {
        category: Category::Work,
        name: "Work & Business",
        emoji: "💼",
        color: "blue",
        keywords: &[
            "meeting", "project", "deadline", "email", "call", "client", "business",
        ],
        description: "Work-related notes and reminders",
    },
    CategoryInfo {
        category: Category::Tasks,
        name: "Tasks & Reminders",
        emoji: "📝",
        color: "orange",
        keywords: &[
            "remember",
            "don't forget",
            "tomorrow",
            "later",
            "remind",
            "todo",
        ],
        description: "Important tasks and reminders",
    },
    CategoryInfo {
        category: Category::Goals,
        name: "Goals & Dreams",
        emoji: "🎯",
        color: "pink",
        keywords: &[
            "want to", "goal", "dream", "aspire", "achieve", "plan", "future",
        ],
        description: "Personal goals and aspirations",
    },
    CategoryInfo {
        category: Category::Random,
        name: "Random Thoughts",
        emoji: "📱",
        color: "gray",
        keywords: &[],
        description: "Miscellaneous thoughts and ideas",
    },
];

impl Category {
    /// Every category in display order, `Random` last.
    pub const ALL: [Category; 6] = [
        Category::Ideas,
        Category::Shopping,
        Category::Work,
        Category::Tasks,
        Category::Goals,
        Category::Random,
    ];

    /// Presentation data for this category.
    pub fn info(self) -> &'static CategoryInfo {
        CATEGORIES
            .iter()
            .find(|info| info.category == self)
            .unwrap_or(&CATEGORIES[CATEGORIES.len() - 1])
    }

    /// Lowercase identifier as stored in the library file.
    pub fn id(self) -> &'static str {
        match self {
            Category::Ideas => "ideas",
            Category::Shopping => "shopping",
            Category::Work => "work",
            Category::Tasks => "tasks",
            Category::Goals => "goals",
            Category::Random => "random",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let info = self.info();
        write!(f, "{} {}", info.emoji, info.name)
    }
}
