use crate::error::ApiError;
use crate::models::{
    Credentials, NewCaregiver, NewElderly, NewMedication, NewTask, Registration, SalaryUpdate,
    TaskStatus,
};
use regex::Regex;
use std::sync::OnceLock;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FieldKind {
    Text,
    Secret,
    Number,
    Status,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Field {
    pub label: &'static str,
    pub value: String,
    pub kind: FieldKind,
}

impl Field {
    fn new(label: &'static str, kind: FieldKind) -> Field {
        Field {
            label,
            value: String::new(),
            kind,
        }
    }

    fn with_value(label: &'static str, kind: FieldKind, value: String) -> Field {
        Field { label, value, kind }
    }

    /// Text shown in the form; secrets are masked.
    pub fn display(&self) -> String {
        match self.kind {
            FieldKind::Secret => "*".repeat(self.value.chars().count()),
            FieldKind::Status => status_from_value(&self.value).label().to_string(),
            _ => self.value.clone(),
        }
    }
}

/// Editable form state: a list of fields with one of them focused.
#[derive(Clone, Debug, PartialEq)]
pub struct FormState {
    pub fields: Vec<Field>,
    pub active: usize,
}

impl FormState {
    fn new(fields: Vec<Field>) -> FormState {
        FormState { fields, active: 0 }
    }

    pub fn login() -> FormState {
        FormState::new(vec![
            Field::new("Email", FieldKind::Text),
            Field::new("Password", FieldKind::Secret),
        ])
    }

    pub fn register() -> FormState {
        FormState::new(vec![
            Field::new("Full Name", FieldKind::Text),
            Field::new("Email", FieldKind::Text),
            Field::new("Password", FieldKind::Secret),
            Field::new("Confirm Password", FieldKind::Secret),
        ])
    }

    pub fn caregiver() -> FormState {
        FormState::new(vec![
            Field::new("Caregiver ID", FieldKind::Number),
            Field::new("Full Name", FieldKind::Text),
            Field::new("Bank Name", FieldKind::Text),
            Field::new("Bank Account", FieldKind::Text),
            Field::new("Branch Number", FieldKind::Text),
        ])
    }

    pub fn salary(current: &SalaryUpdate) -> FormState {
        let num = |v: f64| v.to_string();
        FormState::new(vec![
            Field::with_value("Salary Price (₪)", FieldKind::Number, num(current.salary_price)),
            Field::with_value("Salary Amount", FieldKind::Number, num(current.salary_amount)),
            Field::with_value(
                "Saturday Price (₪)",
                FieldKind::Number,
                num(current.saturday_price),
            ),
            Field::with_value(
                "Saturday Amount",
                FieldKind::Number,
                num(current.saturday_amount),
            ),
            Field::with_value(
                "Allowance Price (₪)",
                FieldKind::Number,
                num(current.allowance_price),
            ),
            Field::with_value(
                "Allowance Amount",
                FieldKind::Number,
                num(current.allowance_amount),
            ),
        ])
    }

    pub fn elderly() -> FormState {
        FormState::new(vec![
            Field::new("Elderly ID", FieldKind::Number),
            Field::new("Full Name", FieldKind::Text),
        ])
    }

    pub fn task() -> FormState {
        FormState::new(vec![
            Field::new("Description", FieldKind::Text),
            Field::with_value("Status", FieldKind::Status, "pending".to_string()),
        ])
    }

    pub fn medication() -> FormState {
        FormState::new(vec![
            Field::new("Medication Name", FieldKind::Text),
            Field::new("Dosage", FieldKind::Text),
            Field::new("Frequency", FieldKind::Text),
        ])
    }

    pub fn value(&self, index: usize) -> &str {
        self.fields
            .get(index)
            .map(|f| f.value.as_str())
            .unwrap_or_default()
    }

    pub fn active_kind(&self) -> Option<FieldKind> {
        self.fields.get(self.active).map(|f| f.kind)
    }

    pub fn next_field(&mut self) {
        if !self.fields.is_empty() {
            self.active = (self.active + 1) % self.fields.len();
        }
    }

    pub fn previous_field(&mut self) {
        if !self.fields.is_empty() {
            self.active = (self.active + self.fields.len() - 1) % self.fields.len();
        }
    }

    /// Typed character goes to the focused field; status fields cycle instead.
    pub fn push(&mut self, c: char) {
        let Some(field) = self.fields.get_mut(self.active) else {
            return;
        };
        match field.kind {
            FieldKind::Status => {
                if c == ' ' {
                    field.value = status_value(status_from_value(&field.value).next());
                }
            }
            FieldKind::Number => {
                if c.is_ascii_digit() || c == '.' || c == '-' {
                    field.value.push(c);
                }
            }
            _ => field.value.push(c),
        }
    }

    pub fn pop(&mut self) {
        if let Some(field) = self.fields.get_mut(self.active) {
            if field.kind != FieldKind::Status {
                field.value.pop();
            }
        }
    }

    fn all_filled(&self) -> bool {
        self.fields.iter().all(|f| !f.value.trim().is_empty())
    }
}

fn status_value(status: TaskStatus) -> String {
    serde_json::to_value(status)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_else(|| "pending".to_string())
}

fn status_from_value(value: &str) -> TaskStatus {
    serde_json::from_value(serde_json::Value::String(value.to_string())).unwrap_or_default()
}

fn invalid(msg: &str) -> ApiError {
    ApiError::Validation(msg.to_string())
}

fn email_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap())
}

fn id_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d+$").unwrap())
}

fn parse_id(raw: &str, msg: &str) -> Result<u64, ApiError> {
    let raw = raw.trim();
    if !id_re().is_match(raw) {
        return Err(invalid(msg));
    }
    raw.parse().map_err(|_| invalid(msg))
}

/// Lenient number parsing: anything unparseable counts as zero.
pub fn parse_amount(raw: &str) -> f64 {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

pub fn validate_login(form: &FormState) -> Result<Credentials, ApiError> {
    if !form.all_filled() {
        return Err(invalid("Please fill in all fields"));
    }
    let email = form.value(0).trim();
    if !email_re().is_match(email) {
        return Err(invalid("Please enter a valid email address"));
    }
    Ok(Credentials {
        email: email.to_string(),
        password: form.value(1).to_string(),
    })
}

pub fn validate_register(form: &FormState) -> Result<Registration, ApiError> {
    if !form.all_filled() {
        return Err(invalid("Please fill in all fields"));
    }
    let email = form.value(1).trim();
    if !email_re().is_match(email) {
        return Err(invalid("Please enter a valid email address"));
    }
    if form.value(2) != form.value(3) {
        return Err(invalid("Passwords do not match"));
    }
    Ok(Registration {
        email: email.to_string(),
        password: form.value(2).to_string(),
        full_name: form.value(0).trim().to_string(),
    })
}

pub fn validate_caregiver(form: &FormState) -> Result<NewCaregiver, ApiError> {
    if !form.all_filled() {
        return Err(invalid("All fields are required"));
    }
    Ok(NewCaregiver {
        custom_id: parse_id(form.value(0), "Caregiver ID must be a number")?,
        name: form.value(1).trim().to_string(),
        bank_name: form.value(2).trim().to_string(),
        bank_account: form.value(3).trim().to_string(),
        branch_number: form.value(4).trim().to_string(),
    })
}

pub fn validate_salary(form: &FormState) -> Result<SalaryUpdate, ApiError> {
    let update = salary_preview(form);
    let values = [
        update.salary_price,
        update.salary_amount,
        update.saturday_price,
        update.saturday_amount,
        update.allowance_price,
        update.allowance_amount,
    ];
    if values.iter().any(|v| *v < 0.0) {
        return Err(invalid("Salary values cannot be negative."));
    }
    Ok(update)
}

/// Current salary form contents, for the live total preview.
pub fn salary_preview(form: &FormState) -> SalaryUpdate {
    SalaryUpdate {
        salary_price: parse_amount(form.value(0)),
        salary_amount: parse_amount(form.value(1)),
        saturday_price: parse_amount(form.value(2)),
        saturday_amount: parse_amount(form.value(3)),
        allowance_price: parse_amount(form.value(4)),
        allowance_amount: parse_amount(form.value(5)),
    }
}

pub fn validate_elderly(form: &FormState) -> Result<NewElderly, ApiError> {
    if !form.all_filled() {
        return Err(invalid("All fields are required"));
    }
    Ok(NewElderly {
        custom_id: parse_id(form.value(0), "Elderly ID must be a number")?,
        name: form.value(1).trim().to_string(),
    })
}

pub fn validate_task(form: &FormState) -> Result<NewTask, ApiError> {
    let description = form.value(0).trim();
    if description.is_empty() {
        return Err(invalid("Task description is required"));
    }
    Ok(NewTask {
        description: description.to_string(),
        status: status_from_value(form.value(1)),
    })
}

pub fn validate_medication(form: &FormState) -> Result<NewMedication, ApiError> {
    if !form.all_filled() {
        return Err(invalid("All fields are required"));
    }
    Ok(NewMedication {
        name: form.value(0).trim().to_string(),
        dosage: form.value(1).trim().to_string(),
        frequency: form.value(2).trim().to_string(),
    })
}
