//! Student service - student profiles and enrollment eligibility.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use tracing::info;
use uuid::Uuid;

use common::{AppError, AppResult, OptionExt, Page, PaginationParams};
use domain::person::{EnrollmentEligibility, Student, StudentStatus};

use super::ensure_profile_free;
use crate::repository::PersonRepositories;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[derive(Debug, Clone, PartialEq)]
pub struct NewStudent {
    pub person_id: Uuid,
    pub student_number: String,
    pub program: String,
    pub enrollment_date: NaiveDate,
    pub expected_graduation: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StudentUpdate {
    pub program: Option<String>,
    pub expected_graduation: Option<NaiveDate>,
}

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait StudentService: Send + Sync {
    /// Create a student profile. The person must exist and hold no profile yet.
    async fn create_student(&self, input: NewStudent) -> AppResult<Student>;

    async fn get_student(&self, id: Uuid) -> AppResult<Student>;

    async fn list_students(
        &self,
        params: PaginationParams,
        status: Option<StudentStatus>,
    ) -> AppResult<Page<Student>>;

    async fn update_student(&self, id: Uuid, update: StudentUpdate) -> AppResult<Student>;

    async fn change_status(&self, id: Uuid, status: StudentStatus) -> AppResult<Student>;

    async fn delete_student(&self, id: Uuid) -> AppResult<()>;

    /// Status plus the kinds of active restrictions that block enrollment
    async fn enrollment_eligibility(&self, student_id: Uuid) -> AppResult<EnrollmentEligibility>;
}

pub struct StudentManager {
    repos: PersonRepositories,
}

impl StudentManager {
    pub fn new(repos: PersonRepositories) -> Self {
        Self { repos }
    }

    async fn load(&self, id: Uuid) -> AppResult<Student> {
        self.repos.students.find_by_id(id).await?.ok_or_not_found("Student")
    }
}

#[async_trait]
impl StudentService for StudentManager {
    async fn create_student(&self, input: NewStudent) -> AppResult<Student> {
        self.repos
            .persons
            .find_by_id(input.person_id)
            .await?
            .ok_or_not_found("Person")?;
        ensure_profile_free(&self.repos, input.person_id).await?;

        if self
            .repos
            .students
            .find_by_number_with_deleted(&input.student_number)
            .await?
            .is_some()
        {
            return Err(AppError::conflict("Student number"));
        }

        let student = Student::new(
            input.person_id,
            &input.student_number,
            &input.program,
            input.enrollment_date,
            input.expected_graduation,
        )?;
        let student = self.repos.students.create(&student).await?;
        info!(student_id = %student.id, person_id = %student.person_id, "Student created");
        Ok(student)
    }

    async fn get_student(&self, id: Uuid) -> AppResult<Student> {
        self.load(id).await
    }

    async fn list_students(
        &self,
        params: PaginationParams,
        status: Option<StudentStatus>,
    ) -> AppResult<Page<Student>> {
        self.repos.students.list(params, status).await
    }

    async fn update_student(&self, id: Uuid, update: StudentUpdate) -> AppResult<Student> {
        let mut student = self.load(id).await?;
        student.update(update.program.as_deref(), update.expected_graduation)?;
        self.repos.students.save(&student).await
    }

    async fn change_status(&self, id: Uuid, status: StudentStatus) -> AppResult<Student> {
        let mut student = self.load(id).await?;
        let previous = student.status;
        student.change_status(status)?;
        let student = self.repos.students.save(&student).await?;
        info!(student_id = %id, from = %previous, to = %status, "Student status changed");
        Ok(student)
    }

    async fn delete_student(&self, id: Uuid) -> AppResult<()> {
        let mut student = self.load(id).await?;
        student.soft_delete();
        self.repos.students.save(&student).await?;
        info!(student_id = %id, "Student deleted");
        Ok(())
    }

    async fn enrollment_eligibility(&self, student_id: Uuid) -> AppResult<EnrollmentEligibility> {
        let student = self.load(student_id).await?;
        let now = Utc::now();

        let mut blocking_restrictions = Vec::new();
        for restriction in self
            .repos
            .restrictions
            .list_for_person(student.person_id)
            .await?
        {
            if restriction.blocks_enrollment(now)
                && !blocking_restrictions.contains(&restriction.kind)
            {
                blocking_restrictions.push(restriction.kind);
            }
        }

        Ok(EnrollmentEligibility {
            student_id: student.id,
            status: student.status,
            blocking_restrictions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use domain::person::{Gender, NewPerson, Person, PersonRestriction, RestrictionKind, Staff};
    use tokio_test::assert_ok;

    use crate::service::test_support::{repos, Mocks};

    fn person() -> Person {
        Person::new(
            NewPerson {
                user_id: None,
                first_name: "Grace".to_string(),
                last_name: "Hopper".to_string(),
                national_id: "GH1906".to_string(),
                date_of_birth: NaiveDate::from_ymd_opt(2001, 12, 9).unwrap(),
                gender: Gender::Female,
                email: None,
                phone: None,
            },
            Utc::now().date_naive(),
        )
        .unwrap()
    }

    fn new_student(person_id: Uuid) -> NewStudent {
        NewStudent {
            person_id,
            student_number: "s2025001".to_string(),
            program: "Computer Science".to_string(),
            enrollment_date: NaiveDate::from_ymd_opt(2025, 9, 1).unwrap(),
            expected_graduation: NaiveDate::from_ymd_opt(2029, 6, 30),
        }
    }

    fn student() -> Student {
        let input = new_student(Uuid::new_v4());
        Student::new(
            input.person_id,
            &input.student_number,
            &input.program,
            input.enrollment_date,
            input.expected_graduation,
        )
        .unwrap()
    }

    fn restriction(person_id: Uuid, kind: RestrictionKind) -> PersonRestriction {
        PersonRestriction::new(
            person_id,
            kind,
            "Hold",
            Utc::now() - Duration::days(1),
            None,
            None,
        )
        .unwrap()
    }

    fn expect_person(mocks: &mut Mocks, person: Person) {
        mocks
            .persons
            .expect_find_by_id()
            .returning(move |_| Ok(Some(person.clone())));
    }

    #[tokio::test]
    async fn test_create_student_requires_person() {
        let mut mocks = Mocks::default();
        mocks.persons.expect_find_by_id().returning(|_| Ok(None));
        let service = StudentManager::new(repos(mocks));

        let result = service.create_student(new_student(Uuid::new_v4())).await;
        assert!(matches!(result, Err(AppError::NotFound(entity)) if entity == "Person"));
    }

    #[tokio::test]
    async fn test_create_student_rejects_staff_person() {
        let person = person();
        let person_id = person.id;
        let staff = Staff::new(
            person_id,
            "E1001",
            "Mathematics",
            "Lecturer",
            NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
        )
        .unwrap();
        let mut mocks = Mocks::default();
        expect_person(&mut mocks, person);
        mocks.students.expect_find_by_person().returning(|_| Ok(None));
        mocks
            .staff
            .expect_find_by_person()
            .returning(move |_| Ok(Some(staff.clone())));
        let service = StudentManager::new(repos(mocks));

        let result = service.create_student(new_student(person_id)).await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_create_student_rejects_taken_number() {
        let person = person();
        let person_id = person.id;
        let taken = student();
        let mut mocks = Mocks::default();
        expect_person(&mut mocks, person);
        mocks.students.expect_find_by_person().returning(|_| Ok(None));
        mocks.staff.expect_find_by_person().returning(|_| Ok(None));
        mocks
            .students
            .expect_find_by_number_with_deleted()
            .returning(move |_| Ok(Some(taken.clone())));
        let service = StudentManager::new(repos(mocks));

        let result = service.create_student(new_student(person_id)).await;
        assert!(
            matches!(result, Err(AppError::Conflict(msg)) if msg == "Student number already exists")
        );
    }

    #[tokio::test]
    async fn test_create_student() {
        let person = person();
        let person_id = person.id;
        let mut mocks = Mocks::default();
        expect_person(&mut mocks, person);
        mocks.students.expect_find_by_person().returning(|_| Ok(None));
        mocks.staff.expect_find_by_person().returning(|_| Ok(None));
        mocks
            .students
            .expect_find_by_number_with_deleted()
            .returning(|_| Ok(None));
        mocks
            .students
            .expect_create()
            .times(1)
            .returning(|s| Ok(s.clone()));
        let service = StudentManager::new(repos(mocks));

        let created = assert_ok!(service.create_student(new_student(person_id)).await);
        assert_eq!(created.student_number, "S2025001");
        assert_eq!(created.status, StudentStatus::Active);
    }

    #[tokio::test]
    async fn test_graduated_student_cannot_be_reactivated() {
        let mut graduated = student();
        graduated.change_status(StudentStatus::Graduated).unwrap();
        let mut mocks = Mocks::default();
        mocks
            .students
            .expect_find_by_id()
            .returning(move |_| Ok(Some(graduated.clone())));
        let service = StudentManager::new(repos(mocks));

        let result = service
            .change_status(Uuid::new_v4(), StudentStatus::Active)
            .await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_eligibility_ignores_administrative_restrictions() {
        let student = student();
        let person_id = student.person_id;
        let restrictions = vec![
            restriction(person_id, RestrictionKind::Administrative),
            restriction(person_id, RestrictionKind::Financial),
            restriction(person_id, RestrictionKind::Financial),
        ];
        let mut mocks = Mocks::default();
        mocks
            .students
            .expect_find_by_id()
            .returning(move |_| Ok(Some(student.clone())));
        mocks
            .restrictions
            .expect_list_for_person()
            .returning(move |_| Ok(restrictions.clone()));
        let service = StudentManager::new(repos(mocks));

        let eligibility = service.enrollment_eligibility(Uuid::new_v4()).await.unwrap();
        assert!(!eligibility.is_eligible());
        assert_eq!(
            eligibility.blocking_restrictions,
            vec![RestrictionKind::Financial]
        );
    }

    #[tokio::test]
    async fn test_eligible_student() {
        let student = student();
        let person_id = student.person_id;
        let mut mocks = Mocks::default();
        mocks
            .students
            .expect_find_by_id()
            .returning(move |_| Ok(Some(student.clone())));
        mocks
            .restrictions
            .expect_list_for_person()
            .returning(move |_| Ok(vec![restriction(person_id, RestrictionKind::Administrative)]));
        let service = StudentManager::new(repos(mocks));

        let eligibility = service.enrollment_eligibility(Uuid::new_v4()).await.unwrap();
        assert!(eligibility.is_eligible());
        assert!(eligibility.reason().is_none());
    }
}
