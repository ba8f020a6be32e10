//! Staff service - employment records.

use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::info;
use uuid::Uuid;

use common::{AppError, AppResult, OptionExt, Page, PaginationParams};
use domain::person::{Staff, StaffStatus};

use super::ensure_profile_free;
use crate::repository::PersonRepositories;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[derive(Debug, Clone, PartialEq)]
pub struct NewStaff {
    pub person_id: Uuid,
    pub employee_number: String,
    pub department: String,
    pub title: String,
    pub hire_date: NaiveDate,
}

/// Partial update. Termination goes through [`StaffService::terminate_staff`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StaffUpdate {
    pub department: Option<String>,
    pub title: Option<String>,
    pub status: Option<StaffStatus>,
}

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait StaffService: Send + Sync {
    async fn create_staff(&self, input: NewStaff) -> AppResult<Staff>;

    async fn get_staff(&self, id: Uuid) -> AppResult<Staff>;

    async fn list_staff(&self, params: PaginationParams, department: Option<String>)
        -> AppResult<Page<Staff>>;

    async fn update_staff(&self, id: Uuid, update: StaffUpdate) -> AppResult<Staff>;

    async fn terminate_staff(&self, id: Uuid, termination_date: NaiveDate) -> AppResult<Staff>;

    async fn delete_staff(&self, id: Uuid) -> AppResult<()>;

    /// Whether the staff member exists and is currently active
    async fn staff_exists(&self, id: Uuid) -> AppResult<bool>;
}

pub struct StaffManager {
    repos: PersonRepositories,
}

impl StaffManager {
    pub fn new(repos: PersonRepositories) -> Self {
        Self { repos }
    }

    async fn load(&self, id: Uuid) -> AppResult<Staff> {
        self.repos.staff.find_by_id(id).await?.ok_or_not_found("Staff member")
    }
}

#[async_trait]
impl StaffService for StaffManager {
    async fn create_staff(&self, input: NewStaff) -> AppResult<Staff> {
        self.repos
            .persons
            .find_by_id(input.person_id)
            .await?
            .ok_or_not_found("Person")?;
        ensure_profile_free(&self.repos, input.person_id).await?;

        if self
            .repos
            .staff
            .find_by_number_with_deleted(&input.employee_number)
            .await?
            .is_some()
        {
            return Err(AppError::conflict("Employee number"));
        }

        let staff = Staff::new(
            input.person_id,
            &input.employee_number,
            &input.department,
            &input.title,
            input.hire_date,
        )?;
        let staff = self.repos.staff.create(&staff).await?;
        info!(staff_id = %staff.id, person_id = %staff.person_id, "Staff member created");
        Ok(staff)
    }

    async fn get_staff(&self, id: Uuid) -> AppResult<Staff> {
        self.load(id).await
    }

    async fn list_staff(
        &self,
        params: PaginationParams,
        department: Option<String>,
    ) -> AppResult<Page<Staff>> {
        self.repos.staff.list(params, department).await
    }

    async fn update_staff(&self, id: Uuid, update: StaffUpdate) -> AppResult<Staff> {
        let mut staff = self.load(id).await?;
        staff.update(
            update.department.as_deref(),
            update.title.as_deref(),
            update.status,
        )?;
        self.repos.staff.save(&staff).await
    }

    async fn terminate_staff(&self, id: Uuid, termination_date: NaiveDate) -> AppResult<Staff> {
        let mut staff = self.load(id).await?;
        staff.terminate(termination_date)?;
        let staff = self.repos.staff.save(&staff).await?;
        info!(staff_id = %id, %termination_date, "Staff member terminated");
        Ok(staff)
    }

    async fn delete_staff(&self, id: Uuid) -> AppResult<()> {
        let mut staff = self.load(id).await?;
        staff.soft_delete();
        self.repos.staff.save(&staff).await?;
        info!(staff_id = %id, "Staff member deleted");
        Ok(())
    }

    async fn staff_exists(&self, id: Uuid) -> AppResult<bool> {
        Ok(self
            .repos
            .staff
            .find_by_id(id)
            .await?
            .is_some_and(|staff| staff.is_active()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    use crate::service::test_support::{repos, Mocks};

    fn hire_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 9, 1).unwrap()
    }

    fn staff() -> Staff {
        Staff::new(Uuid::new_v4(), "E2020", "Physics", "Professor", hire_date()).unwrap()
    }

    #[tokio::test]
    async fn test_create_staff_rejects_student_person() {
        use domain::person::{Gender, NewPerson, Person, Student};

        let person = Person::new(
            NewPerson {
                user_id: None,
                first_name: "Alan".to_string(),
                last_name: "Turing".to_string(),
                national_id: "AT1912".to_string(),
                date_of_birth: NaiveDate::from_ymd_opt(1990, 6, 23).unwrap(),
                gender: Gender::Male,
                email: None,
                phone: None,
            },
            chrono::Utc::now().date_naive(),
        )
        .unwrap();
        let person_id = person.id;
        let student = Student::new(person_id, "S1000", "Logic", hire_date(), None).unwrap();
        let mut mocks = Mocks::default();
        mocks
            .persons
            .expect_find_by_id()
            .returning(move |_| Ok(Some(person.clone())));
        mocks
            .students
            .expect_find_by_person()
            .returning(move |_| Ok(Some(student.clone())));
        let service = StaffManager::new(repos(mocks));

        let result = service
            .create_staff(NewStaff {
                person_id,
                employee_number: "E3000".to_string(),
                department: "Logic".to_string(),
                title: "Lecturer".to_string(),
                hire_date: hire_date(),
            })
            .await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_terminate_before_hire_date_fails() {
        let member = staff();
        let mut mocks = Mocks::default();
        mocks
            .staff
            .expect_find_by_id()
            .returning(move |_| Ok(Some(member.clone())));
        let service = StaffManager::new(repos(mocks));

        let early = NaiveDate::from_ymd_opt(2019, 1, 1).unwrap();
        assert_err!(service.terminate_staff(Uuid::new_v4(), early).await);
    }

    #[tokio::test]
    async fn test_terminate_staff() {
        let member = staff();
        let mut mocks = Mocks::default();
        mocks
            .staff
            .expect_find_by_id()
            .returning(move |_| Ok(Some(member.clone())));
        mocks
            .staff
            .expect_save()
            .withf(|s| s.status == StaffStatus::Terminated)
            .times(1)
            .returning(|s| Ok(s.clone()));
        let service = StaffManager::new(repos(mocks));

        let date = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
        let terminated = assert_ok!(service.terminate_staff(Uuid::new_v4(), date).await);
        assert_eq!(terminated.termination_date, Some(date));
    }

    #[tokio::test]
    async fn test_staff_exists_only_for_active_members() {
        let mut on_leave = staff();
        on_leave.update(None, None, Some(StaffStatus::OnLeave)).unwrap();
        let mut mocks = Mocks::default();
        mocks
            .staff
            .expect_find_by_id()
            .returning(move |_| Ok(Some(on_leave.clone())));
        let service = StaffManager::new(repos(mocks));
        assert!(!service.staff_exists(Uuid::new_v4()).await.unwrap());

        let mut mocks = Mocks::default();
        mocks.staff.expect_find_by_id().returning(|_| Ok(None));
        let service = StaffManager::new(repos(mocks));
        assert!(!service.staff_exists(Uuid::new_v4()).await.unwrap());
    }
}
