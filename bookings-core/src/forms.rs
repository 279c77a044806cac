use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;

pub const BLANK_FIELD: &str = "This field cannot be blank";
pub const INVALID_EMAIL: &str = "Invalid email address";

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*\.[a-zA-Z]{2,}$",
    )
    .expect("email pattern compiles")
});

/// Per-field validation messages, in the order they were raised.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FormErrors(HashMap<String, Vec<String>>);

impl FormErrors {
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_default().push(message.into());
    }

    /// First message recorded for `field`, if any.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).and_then(|msgs| msgs.first()).map(String::as_str)
    }

    pub fn messages(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

/// Submitted form values plus the errors raised while checking them.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Form {
    values: HashMap<String, String>,
    pub errors: FormErrors,
}

impl Form {
    pub fn new(values: HashMap<String, String>) -> Self {
        Self {
            values,
            errors: FormErrors::default(),
        }
    }

    /// Value of `field`, or the empty string when it was not submitted.
    pub fn get(&self, field: &str) -> &str {
        self.values.get(field).map(String::as_str).unwrap_or("")
    }

    /// Always recomputed from the error map.
    pub fn valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn has(&mut self, field: &str) -> bool {
        if self.get(field).is_empty() {
            self.errors.add(field, BLANK_FIELD);
            return false;
        }
        true
    }

    /// Checks every field; `false` if any of them was blank.
    pub fn required(&mut self, fields: &[&str]) -> bool {
        let mut all_present = true;
        for field in fields {
            if self.get(field).trim().is_empty() {
                self.errors.add(field, BLANK_FIELD);
                all_present = false;
            }
        }
        all_present
    }

    pub fn min_length(&mut self, field: &str, length: usize) -> bool {
        if !meets_min_length(self.get(field), length) {
            self.errors.add(
                field,
                format!("This field must be at least {} characters long", length),
            );
            return false;
        }
        true
    }

    pub fn is_email(&mut self, field: &str) -> bool {
        if !is_valid_email(self.get(field)) {
            self.errors.add(field, INVALID_EMAIL);
            return false;
        }
        true
    }

    pub fn apply(&mut self, rule: &Rule) -> bool {
        match rule {
            Rule::Required(fields) => {
                let names: Vec<&str> = fields.iter().map(String::as_str).collect();
                self.required(&names)
            }
            Rule::MinLength(field, length) => self.min_length(field, *length),
            Rule::IsEmail(field) => self.is_email(field),
            Rule::Has(field) => self.has(field),
        }
    }

    pub fn into_result(self) -> ValidationResult {
        ValidationResult { errors: self.errors }
    }
}

/// Length is counted in characters, not bytes.
pub fn meets_min_length(value: &str, length: usize) -> bool {
    value.chars().count() >= length
}

pub fn is_valid_email(value: &str) -> bool {
    EMAIL_RE.is_match(value)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    Required(Vec<String>),
    MinLength(String, usize),
    IsEmail(String),
    Has(String),
}

impl Rule {
    pub fn required(fields: &[&str]) -> Self {
        Rule::Required(fields.iter().map(|f| f.to_string()).collect())
    }

    pub fn min_length(field: &str, length: usize) -> Self {
        Rule::MinLength(field.to_string(), length)
    }

    pub fn is_email(field: &str) -> Self {
        Rule::IsEmail(field.to_string())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub errors: FormErrors,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Runs every rule against `fields`; no rule short-circuits another.
pub fn validate(fields: &HashMap<String, String>, rules: &[Rule]) -> ValidationResult {
    let mut form = Form::new(fields.clone());
    for rule in rules {
        form.apply(rule);
    }
    form.into_result()
}
