//! Person service - person records and everything hanging off them.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::info;
use uuid::Uuid;

use common::{AppError, AppResult, OptionExt, Page, PaginationParams};
use domain::person::{
    Address, AddressData, EmergencyContact, HealthRecord, HealthRecordData, NewPerson, Person,
    PersonRestriction, PersonUpdate, RestrictionKind,
};

use crate::repository::PersonRepositories;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Input for adding an emergency contact
#[derive(Debug, Clone, PartialEq)]
pub struct NewEmergencyContact {
    pub name: String,
    pub relationship: String,
    pub phone: String,
    pub email: Option<String>,
}

/// Input for placing a restriction. `starts_at` defaults to now.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRestriction {
    pub kind: RestrictionKind,
    pub reason: String,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
}

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait PersonService: Send + Sync {
    async fn create_person(&self, input: NewPerson) -> AppResult<Person>;

    async fn get_person(&self, id: Uuid) -> AppResult<Person>;

    async fn list_persons(&self, params: PaginationParams, search: Option<String>)
        -> AppResult<Page<Person>>;

    async fn update_person(&self, id: Uuid, update: PersonUpdate) -> AppResult<Person>;

    async fn delete_person(&self, id: Uuid) -> AppResult<()>;

    async fn restore_person(&self, id: Uuid) -> AppResult<Person>;

    async fn list_addresses(&self, person_id: Uuid) -> AppResult<Vec<Address>>;

    async fn add_address(&self, person_id: Uuid, data: AddressData) -> AppResult<Address>;

    async fn update_address(
        &self,
        person_id: Uuid,
        address_id: Uuid,
        data: AddressData,
    ) -> AppResult<Address>;

    async fn remove_address(&self, person_id: Uuid, address_id: Uuid) -> AppResult<()>;

    async fn list_contacts(&self, person_id: Uuid) -> AppResult<Vec<EmergencyContact>>;

    async fn add_contact(
        &self,
        person_id: Uuid,
        input: NewEmergencyContact,
    ) -> AppResult<EmergencyContact>;

    async fn remove_contact(&self, person_id: Uuid, contact_id: Uuid) -> AppResult<()>;

    /// Restrictions of a person; `active_only` keeps those in force now
    async fn list_restrictions(
        &self,
        person_id: Uuid,
        active_only: bool,
    ) -> AppResult<Vec<PersonRestriction>>;

    async fn add_restriction(
        &self,
        person_id: Uuid,
        input: NewRestriction,
        created_by: Option<Uuid>,
    ) -> AppResult<PersonRestriction>;

    async fn lift_restriction(
        &self,
        person_id: Uuid,
        restriction_id: Uuid,
        reason: Option<String>,
    ) -> AppResult<PersonRestriction>;

    async fn get_health_record(&self, person_id: Uuid) -> AppResult<HealthRecord>;

    /// Create the record on first write, replace it afterwards
    async fn upsert_health_record(
        &self,
        person_id: Uuid,
        data: HealthRecordData,
    ) -> AppResult<HealthRecord>;
}

pub struct PersonManager {
    repos: PersonRepositories,
}

impl PersonManager {
    pub fn new(repos: PersonRepositories) -> Self {
        Self { repos }
    }

    async fn load(&self, id: Uuid) -> AppResult<Person> {
        self.repos.persons.find_by_id(id).await?.ok_or_not_found("Person")
    }

    async fn load_address(&self, person_id: Uuid, address_id: Uuid) -> AppResult<Address> {
        self.repos
            .contacts
            .find_address(address_id)
            .await?
            .filter(|a| a.person_id == person_id)
            .ok_or_not_found("Address")
    }
}

#[async_trait]
impl PersonService for PersonManager {
    async fn create_person(&self, input: NewPerson) -> AppResult<Person> {
        if self
            .repos
            .persons
            .find_by_national_id_with_deleted(&input.national_id)
            .await?
            .is_some()
        {
            return Err(AppError::conflict("National ID"));
        }

        let person = Person::new(input, Utc::now().date_naive())?;
        let person = self.repos.persons.create(&person).await?;
        info!(person_id = %person.id, "Person created");
        Ok(person)
    }

    async fn get_person(&self, id: Uuid) -> AppResult<Person> {
        self.load(id).await
    }

    async fn list_persons(
        &self,
        params: PaginationParams,
        search: Option<String>,
    ) -> AppResult<Page<Person>> {
        self.repos.persons.list(params, search).await
    }

    async fn update_person(&self, id: Uuid, update: PersonUpdate) -> AppResult<Person> {
        let mut person = self.load(id).await?;
        person.apply(update, Utc::now().date_naive())?;
        self.repos.persons.save(&person).await
    }

    async fn delete_person(&self, id: Uuid) -> AppResult<()> {
        let mut person = self.load(id).await?;
        person.soft_delete();
        self.repos.persons.save(&person).await?;
        info!(person_id = %id, "Person deleted");
        Ok(())
    }

    async fn restore_person(&self, id: Uuid) -> AppResult<Person> {
        let mut person = self
            .repos
            .persons
            .find_by_id_with_deleted(id)
            .await?
            .ok_or_not_found("Person")?;
        person.restore()?;
        self.repos.persons.save(&person).await
    }

    // =========================================================================
    // Addresses
    // =========================================================================

    async fn list_addresses(&self, person_id: Uuid) -> AppResult<Vec<Address>> {
        self.load(person_id).await?;
        self.repos.contacts.list_addresses(person_id).await
    }

    async fn add_address(&self, person_id: Uuid, data: AddressData) -> AppResult<Address> {
        self.load(person_id).await?;
        let address = Address::new(person_id, data)?;
        self.repos.contacts.create_address(&address).await
    }

    async fn update_address(
        &self,
        person_id: Uuid,
        address_id: Uuid,
        data: AddressData,
    ) -> AppResult<Address> {
        let mut address = self.load_address(person_id, address_id).await?;
        address.replace(data)?;
        self.repos.contacts.save_address(&address).await
    }

    async fn remove_address(&self, person_id: Uuid, address_id: Uuid) -> AppResult<()> {
        self.load_address(person_id, address_id).await?;
        self.repos.contacts.delete_address(address_id).await?;
        Ok(())
    }

    // =========================================================================
    // Emergency contacts
    // =========================================================================

    async fn list_contacts(&self, person_id: Uuid) -> AppResult<Vec<EmergencyContact>> {
        self.load(person_id).await?;
        self.repos.contacts.list_contacts(person_id).await
    }

    async fn add_contact(
        &self,
        person_id: Uuid,
        input: NewEmergencyContact,
    ) -> AppResult<EmergencyContact> {
        self.load(person_id).await?;
        let contact = EmergencyContact::new(
            person_id,
            &input.name,
            &input.relationship,
            &input.phone,
            input.email,
        )?;
        self.repos.contacts.create_contact(&contact).await
    }

    async fn remove_contact(&self, person_id: Uuid, contact_id: Uuid) -> AppResult<()> {
        self.repos
            .contacts
            .find_contact(contact_id)
            .await?
            .filter(|c| c.person_id == person_id)
            .ok_or_not_found("Emergency contact")?;
        self.repos.contacts.delete_contact(contact_id).await?;
        Ok(())
    }

    // =========================================================================
    // Restrictions
    // =========================================================================

    async fn list_restrictions(
        &self,
        person_id: Uuid,
        active_only: bool,
    ) -> AppResult<Vec<PersonRestriction>> {
        self.load(person_id).await?;
        let mut restrictions = self.repos.restrictions.list_for_person(person_id).await?;
        if active_only {
            let now = Utc::now();
            restrictions.retain(|r| r.is_active(now));
        }
        Ok(restrictions)
    }

    async fn add_restriction(
        &self,
        person_id: Uuid,
        input: NewRestriction,
        created_by: Option<Uuid>,
    ) -> AppResult<PersonRestriction> {
        self.load(person_id).await?;
        let restriction = PersonRestriction::new(
            person_id,
            input.kind,
            &input.reason,
            input.starts_at.unwrap_or_else(Utc::now),
            input.ends_at,
            created_by,
        )?;
        let restriction = self.repos.restrictions.create(&restriction).await?;
        info!(
            person_id = %person_id,
            restriction_id = %restriction.id,
            kind = %restriction.kind,
            "Restriction placed"
        );
        Ok(restriction)
    }

    async fn lift_restriction(
        &self,
        person_id: Uuid,
        restriction_id: Uuid,
        reason: Option<String>,
    ) -> AppResult<PersonRestriction> {
        let mut restriction = self
            .repos
            .restrictions
            .find_by_id(restriction_id)
            .await?
            .filter(|r| r.person_id == person_id)
            .ok_or_not_found("Restriction")?;
        restriction.lift(Utc::now(), reason)?;
        let restriction = self.repos.restrictions.save(&restriction).await?;
        info!(person_id = %person_id, restriction_id = %restriction_id, "Restriction lifted");
        Ok(restriction)
    }

    // =========================================================================
    // Health record
    // =========================================================================

    async fn get_health_record(&self, person_id: Uuid) -> AppResult<HealthRecord> {
        self.load(person_id).await?;
        self.repos
            .health
            .find_by_person(person_id)
            .await?
            .ok_or_not_found("Health record")
    }

    async fn upsert_health_record(
        &self,
        person_id: Uuid,
        data: HealthRecordData,
    ) -> AppResult<HealthRecord> {
        self.load(person_id).await?;
        match self.repos.health.find_by_person(person_id).await? {
            Some(mut record) => {
                record.replace(data);
                self.repos.health.save(&record).await
            }
            None => {
                let record = HealthRecord::new(person_id, data);
                self.repos.health.create(&record).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};
    use domain::person::{AddressKind, Gender};
    use tokio_test::{assert_err, assert_ok};

    use crate::service::test_support::{repos, Mocks};

    fn new_person() -> NewPerson {
        NewPerson {
            user_id: None,
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            national_id: "ab12345".to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(1995, 12, 10).unwrap(),
            gender: Gender::Female,
            email: Some("Ada@Uni.edu".to_string()),
            phone: None,
        }
    }

    fn person() -> Person {
        Person::new(new_person(), Utc::now().date_naive()).unwrap()
    }

    fn address_data(is_primary: bool) -> AddressData {
        AddressData {
            kind: AddressKind::Home,
            line1: "1 Main Street".to_string(),
            line2: None,
            city: "Springfield".to_string(),
            state: None,
            postal_code: "12345".to_string(),
            country: "us".to_string(),
            is_primary,
        }
    }

    #[tokio::test]
    async fn test_create_person_rejects_duplicate_national_id() {
        let existing = person();
        let mut mocks = Mocks::default();
        mocks
            .persons
            .expect_find_by_national_id_with_deleted()
            .returning(move |_| Ok(Some(existing.clone())));
        let service = PersonManager::new(repos(mocks));

        let result = service.create_person(new_person()).await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_create_person_normalizes_fields() {
        let mut mocks = Mocks::default();
        mocks
            .persons
            .expect_find_by_national_id_with_deleted()
            .returning(|_| Ok(None));
        mocks
            .persons
            .expect_create()
            .times(1)
            .returning(|p| Ok(p.clone()));
        let service = PersonManager::new(repos(mocks));

        let person = assert_ok!(service.create_person(new_person()).await);
        assert_eq!(person.national_id, "AB12345");
        assert_eq!(person.email.as_deref(), Some("ada@uni.edu"));
    }

    #[tokio::test]
    async fn test_get_deleted_person_is_not_found() {
        let mut mocks = Mocks::default();
        mocks.persons.expect_find_by_id().returning(|_| Ok(None));
        let service = PersonManager::new(repos(mocks));

        let result = service.get_person(Uuid::new_v4()).await;
        assert!(matches!(result, Err(AppError::NotFound(entity)) if entity == "Person"));
    }

    #[tokio::test]
    async fn test_restore_active_person_fails() {
        let existing = person();
        let mut mocks = Mocks::default();
        mocks
            .persons
            .expect_find_by_id_with_deleted()
            .returning(move |_| Ok(Some(existing.clone())));
        let service = PersonManager::new(repos(mocks));

        let result = service.restore_person(Uuid::new_v4()).await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_update_address_of_other_person_is_not_found() {
        let stranger = Address::new(Uuid::new_v4(), address_data(false)).unwrap();
        let mut mocks = Mocks::default();
        mocks
            .contacts
            .expect_find_address()
            .returning(move |_| Ok(Some(stranger.clone())));
        let service = PersonManager::new(repos(mocks));

        let result = service
            .update_address(Uuid::new_v4(), Uuid::new_v4(), address_data(true))
            .await;
        assert!(matches!(result, Err(AppError::NotFound(entity)) if entity == "Address"));
    }

    #[tokio::test]
    async fn test_add_primary_address() {
        let owner = person();
        let owner_id = owner.id;
        let mut mocks = Mocks::default();
        mocks
            .persons
            .expect_find_by_id()
            .returning(move |_| Ok(Some(owner.clone())));
        mocks
            .contacts
            .expect_create_address()
            .withf(move |a| a.person_id == owner_id && a.is_primary && a.country == "US")
            .times(1)
            .returning(|a| Ok(a.clone()));
        let service = PersonManager::new(repos(mocks));

        assert_ok!(service.add_address(owner_id, address_data(true)).await);
    }

    #[tokio::test]
    async fn test_list_active_restrictions_filters_lifted_and_expired() {
        let owner = person();
        let owner_id = owner.id;
        let now = Utc::now();
        let active = PersonRestriction::new(
            owner_id,
            RestrictionKind::Financial,
            "Unpaid fees",
            now - Duration::days(1),
            None,
            None,
        )
        .unwrap();
        let expired = PersonRestriction::new(
            owner_id,
            RestrictionKind::Academic,
            "Probation",
            now - Duration::days(10),
            Some(now - Duration::days(2)),
            None,
        )
        .unwrap();
        let mut lifted = active.clone();
        lifted.id = Uuid::new_v4();
        lifted.lift(now, None).unwrap();

        let all = vec![active.clone(), expired, lifted];
        let mut mocks = Mocks::default();
        mocks
            .persons
            .expect_find_by_id()
            .returning(move |_| Ok(Some(owner.clone())));
        mocks
            .restrictions
            .expect_list_for_person()
            .returning(move |_| Ok(all.clone()));
        let service = PersonManager::new(repos(mocks));

        let listed = service.list_restrictions(owner_id, true).await.unwrap();
        assert_eq!(listed, vec![active]);
    }

    #[tokio::test]
    async fn test_lift_restriction_twice_fails() {
        let person_id = Uuid::new_v4();
        let mut restriction = PersonRestriction::new(
            person_id,
            RestrictionKind::Disciplinary,
            "Conduct",
            Utc::now() - Duration::hours(1),
            None,
            None,
        )
        .unwrap();
        restriction.lift(Utc::now(), None).unwrap();
        let mut mocks = Mocks::default();
        mocks
            .restrictions
            .expect_find_by_id()
            .returning(move |_| Ok(Some(restriction.clone())));
        let service = PersonManager::new(repos(mocks));

        assert_err!(service.lift_restriction(person_id, Uuid::new_v4(), None).await);
    }

    #[tokio::test]
    async fn test_upsert_health_record_replaces_existing() {
        let owner = person();
        let owner_id = owner.id;
        let existing = HealthRecord::new(owner_id, HealthRecordData::default());
        let existing_id = existing.id;
        let mut mocks = Mocks::default();
        mocks
            .persons
            .expect_find_by_id()
            .returning(move |_| Ok(Some(owner.clone())));
        mocks
            .health
            .expect_find_by_person()
            .returning(move |_| Ok(Some(existing.clone())));
        mocks.health.expect_create().never();
        mocks
            .health
            .expect_save()
            .withf(move |r| r.id == existing_id && r.allergies == vec!["Peanuts".to_string()])
            .times(1)
            .returning(|r| Ok(r.clone()));
        let service = PersonManager::new(repos(mocks));

        let data = HealthRecordData {
            allergies: vec![" Peanuts ".to_string(), "peanuts".to_string()],
            ..Default::default()
        };
        assert_ok!(service.upsert_health_record(owner_id, data).await);
    }
}
