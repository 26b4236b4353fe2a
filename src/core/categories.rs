//! Complaint category definitions
//!
//! This module holds the keyword dictionary used to classify reviews. Each
//! category owns a list of lower-case text fragments; a review belongs to a
//! category when any fragment occurs in its text.

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

/// Fallback label used when no keyword matches
pub const DEFAULT_FALLBACK: &str = "Другое";

lazy_static! {
    /// Built-in keyword table, in declaration order
    pub static ref DEFAULT_CATEGORIES: Vec<CategoryEntry> = default_entries();
}

/// A single category with its keyword fragments
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryEntry {
    pub name: String,
    pub keywords: Vec<String>,
}

impl CategoryEntry {
    pub fn new<S: Into<String>>(name: S, keywords: &[&str]) -> Self {
        Self {
            name: name.into(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }
}

/// Ordered mapping from category name to keywords, plus the fallback label
///
/// Declaration order decides how ties between categories are broken
/// everywhere in the crate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryDictionary {
    entries: Vec<CategoryEntry>,
    fallback: String,
}

impl Default for CategoryDictionary {
    fn default() -> Self {
        Self::new(DEFAULT_CATEGORIES.clone(), DEFAULT_FALLBACK)
    }
}

impl CategoryDictionary {
    /// Build a dictionary from custom entries
    ///
    /// Keywords are lower-cased and trimmed; blank keywords are dropped so they
    /// cannot match every text.
    pub fn new<S: Into<String>>(entries: Vec<CategoryEntry>, fallback: S) -> Self {
        let entries = entries
            .into_iter()
            .map(|entry| CategoryEntry {
                name: entry.name,
                keywords: entry
                    .keywords
                    .iter()
                    .map(|k| k.trim().to_lowercase())
                    .filter(|k| !k.is_empty())
                    .collect(),
            })
            .collect();

        Self {
            entries,
            fallback: fallback.into(),
        }
    }

    pub fn categories(&self) -> &[CategoryEntry] {
        &self.entries
    }

    pub fn fallback(&self) -> &str {
        &self.fallback
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Position of a label in tie-break order
    ///
    /// Declared categories rank by declaration index, the fallback ranks right
    /// after them, and unknown labels rank last.
    pub fn rank(&self, label: &str) -> usize {
        if let Some(index) = self.entries.iter().position(|e| e.name == label) {
            index
        } else if label == self.fallback {
            self.entries.len()
        } else {
            self.entries.len() + 1
        }
    }
}

fn default_entries() -> Vec<CategoryEntry> {
    vec![
        CategoryEntry::new(
            "Размер не подходит",
            &[
                "не по размеру", "не подошла", "мала", "маленькая", "зазоры", "короткой",
                "не полностью закрывает", "не на весь экран", "прорези не совпадают",
                "не закрывает края", "меньше по диагонали", "кривой вырез",
                "не совпал с камерой", "неподошли", "большие", "вырез под камеру", "размер",
            ],
        ),
        CategoryEntry::new(
            "Качество материала",
            &[
                "тонкая", "качество", "ужасное", "рябит", "размыто", "тоненькая", "пузырь",
                "отклеивается", "по краям", "болят глаза", "не приклеивается", "колется",
                "видно плохо", "в масле", "точки", "шлифовальная", "царапается", "не ровная",
                "углы отклеились", "остаются полосы", "не рекомендую",
                "края не приклеиваются", "задирается", "отходит",
            ],
        ),
        CategoryEntry::new(
            "Брак",
            &[
                "мусор", "грязная", "царапина", "грязное", "повреждение", "дефект", "сломано",
                "брак", "треснуло", "треснула", "помятая упаковка", "стекло треснуло",
                "порвался",
            ],
        ),
        CategoryEntry::new(
            "Ошибка комплектации",
            &[
                "вместо", "не то", "ошибка", "перепутали", "не заказывал", "гидрогелевая",
                "не полиуретановая", "пришло не то", "вырез не такой", "не соответствует",
                "андроид вместо айфон", "другой цвет", "прислали глянец", "прислали одну",
                "заказал две", "пришло на андроид", "прислали не ту", "одна плёнка",
                "не подходит",
            ],
        ),
        CategoryEntry::new(
            "Визуальное искажение",
            &["искажает", "блекло", "размыто", "всё мутно", "искажение"],
        ),
        CategoryEntry::new(
            "Функциональные проблемы",
            &[
                "отпечаток", "палец не видит", "палец не срабатывает", "не реагирует",
                "не срабатывает отпечаток", "face id", "touch id", "буквы не срабатывают",
                "экран не чувствительный", "пароль не вводится", "яркость", "затеняет",
            ],
        ),
        CategoryEntry::new(
            "Запах",
            &["воняет", "воняла", "пахнет", "запах", "неприятный запах", "вонь"],
        ),
        CategoryEntry::new("Доставка", &["мятая", "коробка"]),
        CategoryEntry::new("Инструкция", &["не понятная", "сложно"]),
    ]
}
