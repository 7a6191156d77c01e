use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An employee as returned by `GET employees/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    /// Database primary key.
    pub id: u64,
    /// HR-assigned identifier (e.g. `EMP001`).
    pub employee_id: String,
    pub full_name: String,
    pub email: String,
    pub department: String,
    pub created_at: DateTime<Utc>,
}

impl Employee {
    /// `"Full Name (EMP001)"`, as shown in pickers.
    pub fn display_name(&self) -> String {
        format!("{} ({})", self.full_name, self.employee_id)
    }
}

/// Payload for `POST employees/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewEmployee {
    pub employee_id: String,
    pub full_name: String,
    pub email: String,
    pub department: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_employee() {
        let json = r#"{
            "id": 3,
            "employee_id": "EMP003",
            "full_name": "Carol Diaz",
            "email": "carol@example.com",
            "department": "Finance",
            "created_at": "2025-01-14T09:30:00.123456Z"
        }"#;
        let employee: Employee = serde_json::from_str(json).unwrap();
        assert_eq!(employee.id, 3);
        assert_eq!(employee.display_name(), "Carol Diaz (EMP003)");
    }
}
