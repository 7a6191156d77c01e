//! Employee endpoints.

use log::debug;

use crate::client::HrmsClient;
use crate::error::Error;
use crate::model::{Employee, NewEmployee};

impl HrmsClient {
    /// List employees ordered by name.
    ///
    /// `search` matches name, employee ID or department, case-insensitively.
    /// Blank searches are not sent.
    pub async fn list_employees(&self, search: Option<&str>) -> Result<Vec<Employee>, Error> {
        let pairs: Vec<(&str, String)> = search
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| vec![("search", s.to_string())])
            .unwrap_or_default();
        let url = self.endpoint_with_query("employees/", &pairs)?;
        self.get_json(url).await
    }

    /// Create an employee. All fields are required.
    pub async fn add_employee(&self, employee: &NewEmployee) -> Result<Employee, Error> {
        validate_new_employee(employee)?;
        let url = self.endpoint("employees/")?;
        let created: Employee = self.post_json(url, employee).await?;
        debug!("created employee {} ({})", created.id, created.employee_id);
        Ok(created)
    }

    /// Delete an employee and, on the server, their attendance records.
    pub async fn delete_employee(&self, id: u64) -> Result<(), Error> {
        let url = self.endpoint(&format!("employees/{id}/"))?;
        self.delete(url).await
    }
}

fn validate_new_employee(employee: &NewEmployee) -> Result<(), Error> {
    let fields = [
        &employee.employee_id,
        &employee.full_name,
        &employee.email,
        &employee.department,
    ];
    if fields.iter().any(|f| f.trim().is_empty()) {
        return Err(Error::validation("All fields are required."));
    }
    if !employee.email.contains('@') {
        return Err(Error::validation("Enter a valid email address."));
    }
    Ok(())
}
