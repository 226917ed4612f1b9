use serde::{Deserialize, Serialize};
use std::fmt;

// Salary component: rate (price) and count (amount)
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct SalaryComponent {
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub amount: f64,
    #[serde(default)]
    pub total: f64,
}

// Assignment join record
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct Assignment {
    pub id: u64,
    pub caregiver_id: u64,
    pub elderly_id: u64,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct Caregiver {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub custom_id: Option<u64>,
    #[serde(default)]
    pub bank_name: String,
    #[serde(default)]
    pub bank_account: String,
    #[serde(default)]
    pub branch_number: String,
    #[serde(default)]
    pub salary: SalaryComponent,
    #[serde(default)]
    pub allowance: SalaryComponent,
    #[serde(default)]
    pub saturday: SalaryComponent,
    #[serde(default)]
    pub total_bank: f64,
    #[serde(default)]
    pub assignments: Vec<Assignment>,
}

impl Caregiver {
    /// Rate-only sum shown in the caregiver table.
    pub fn card_total(&self) -> f64 {
        self.salary.price + self.allowance.price + self.saturday.price
    }

    /// Business id when set, database id otherwise.
    pub fn display_id(&self) -> u64 {
        self.custom_id.unwrap_or(self.id)
    }
}

#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Pending,
    #[serde(alias = "in progress")]
    InProgress,
    Completed,
}

impl TaskStatus {
    pub fn label(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "Pending",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Completed => "Completed",
        }
    }

    pub fn next(&self) -> TaskStatus {
        match self {
            TaskStatus::Pending => TaskStatus::InProgress,
            TaskStatus::InProgress => TaskStatus::Completed,
            TaskStatus::Completed => TaskStatus::Pending,
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct Task {
    #[serde(default)]
    pub id: Option<u64>,
    pub description: String,
    #[serde(default)]
    pub status: TaskStatus,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct Medication {
    #[serde(default)]
    pub id: Option<u64>,
    pub name: String,
    pub dosage: String,
    pub frequency: String,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct Elderly {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub custom_id: Option<u64>,
    #[serde(default)]
    pub assignments: Vec<Assignment>,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub medications: Vec<Medication>,
}

impl Elderly {
    pub fn display_id(&self) -> u64 {
        self.custom_id.unwrap_or(self.id)
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct User {
    pub id: u64,
    pub email: String,
    pub full_name: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

#[derive(Clone, Debug, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub user_id: u64,
    pub email: String,
    pub full_name: String,
}

impl LoginResponse {
    pub fn user(&self) -> User {
        User {
            id: self.user_id,
            email: self.email.clone(),
            full_name: self.full_name.clone(),
            is_active: true,
        }
    }
}

// Request payloads

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub full_name: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct NewCaregiver {
    pub custom_id: u64,
    pub name: String,
    pub bank_name: String,
    pub bank_account: String,
    pub branch_number: String,
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct SalaryUpdate {
    pub salary_price: f64,
    pub salary_amount: f64,
    pub saturday_price: f64,
    pub saturday_amount: f64,
    pub allowance_price: f64,
    pub allowance_amount: f64,
}

impl SalaryUpdate {
    pub fn from_caregiver(caregiver: &Caregiver) -> SalaryUpdate {
        SalaryUpdate {
            salary_price: caregiver.salary.price,
            salary_amount: caregiver.salary.amount,
            saturday_price: caregiver.saturday.price,
            saturday_amount: caregiver.saturday.amount,
            allowance_price: caregiver.allowance.price,
            allowance_amount: caregiver.allowance.amount,
        }
    }

    /// Rate times amount, summed over the three components.
    pub fn preview_total(&self) -> f64 {
        self.salary_price * self.salary_amount
            + self.saturday_price * self.saturday_amount
            + self.allowance_price * self.allowance_amount
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct NewElderly {
    pub custom_id: u64,
    pub name: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct NewTask {
    pub description: String,
    pub status: TaskStatus,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct NewMedication {
    pub name: String,
    pub dosage: String,
    pub frequency: String,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewAssignment {
    pub caregiver_id: u64,
    pub elderly_id: u64,
}
