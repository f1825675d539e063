use milkrun_core::repository::CascadeReport;
use milkrun_core::{CoreError, CoreResult, OwnerId};
use milkrun_shared::models::{Customer, CustomerUpdate, NewCustomer};
use milkrun_shared::money::{fits_scale, MONEY_SCALE, QUANTITY_SCALE};
use milkrun_shared::Period;
use rust_decimal::Decimal;
use tracing::info;
use uuid::Uuid;

use super::LedgerService;
use crate::statement::CustomerStatement;

fn validate_name(name: &str) -> CoreResult<()> {
    if name.trim().is_empty() {
        return Err(CoreError::ValidationError("Customer name is required".to_string()));
    }
    Ok(())
}

fn validate_phone(phone: &str) -> CoreResult<()> {
    if phone.is_empty() || !phone.chars().all(|c| c.is_ascii_digit()) {
        return Err(CoreError::ValidationError(
            "Phone number must contain digits only".to_string(),
        ));
    }
    Ok(())
}

pub(crate) fn validate_amount(field: &str, value: Decimal, scale: u32) -> CoreResult<()> {
    if value < Decimal::ZERO {
        return Err(CoreError::ValidationError(format!("{} must not be negative", field)));
    }
    if !fits_scale(value, scale) {
        return Err(CoreError::ValidationError(format!(
            "{} allows at most {} decimal places",
            field, scale
        )));
    }
    Ok(())
}

impl LedgerService {
    pub async fn register_customer(&self, owner: &OwnerId, registration: NewCustomer) -> CoreResult<Customer> {
        let registration = NewCustomer {
            name: registration.name.trim().to_string(),
            phone: registration.phone.trim().to_string(),
            ..registration
        };
        validate_name(&registration.name)?;
        validate_phone(&registration.phone)?;
        validate_amount("Quantity", registration.quantity, QUANTITY_SCALE)?;
        validate_amount("Price", registration.price, MONEY_SCALE)?;

        if self.store.find_customer_by_name(owner, &registration.name).await?.is_some() {
            return Err(CoreError::ValidationError(
                "Customer with this name already exists for your account.".to_string(),
            ));
        }

        let customer = Customer::new(owner.to_string(), registration);
        self.store.create_customer(&customer).await?;

        info!("Registered customer {} for {}", customer.name, owner);
        Ok(customer)
    }

    pub async fn list_customers(&self, owner: &OwnerId) -> CoreResult<Vec<Customer>> {
        Ok(self.store.list_customers(owner).await?)
    }

    pub async fn get_customer(&self, owner: &OwnerId, id: Uuid) -> CoreResult<Customer> {
        self.store
            .get_customer(owner, id)
            .await?
            .ok_or_else(|| CoreError::NotFoundError(format!("Customer {}", id)))
    }

    pub(crate) async fn customer_by_name(&self, owner: &OwnerId, name: &str) -> CoreResult<Customer> {
        self.store
            .find_customer_by_name(owner, name)
            .await?
            .ok_or_else(|| CoreError::NotFoundError(format!("Customer {}", name)))
    }

    /// Edit any field. A rename must not collide with another customer of the owner.
    pub async fn update_customer(&self, owner: &OwnerId, id: Uuid, update: CustomerUpdate) -> CoreResult<Customer> {
        let mut customer = self.get_customer(owner, id).await?;
        let previous_name = customer.name.clone();

        let update = CustomerUpdate {
            name: update.name.map(|n| n.trim().to_string()),
            phone: update.phone.map(|p| p.trim().to_string()),
            ..update
        };
        if let Some(name) = &update.name {
            validate_name(name)?;
            if *name != previous_name && self.store.find_customer_by_name(owner, name).await?.is_some() {
                return Err(CoreError::ValidationError(
                    "Customer with this name already exists for your account.".to_string(),
                ));
            }
        }
        if let Some(phone) = &update.phone {
            validate_phone(phone)?;
        }
        if let Some(quantity) = update.quantity {
            validate_amount("Quantity", quantity, QUANTITY_SCALE)?;
        }
        if let Some(price) = update.price {
            validate_amount("Price", price, MONEY_SCALE)?;
        }

        customer.apply(update);
        self.store.update_customer(&previous_name, &customer).await?;

        if previous_name != customer.name {
            info!("Renamed customer {} to {} for {}", previous_name, customer.name, owner);
        }
        Ok(customer)
    }

    /// Start or stop daily delivery. Only the coarse flag changes; history stays as recorded.
    pub async fn set_delivering(&self, owner: &OwnerId, id: Uuid, delivering: bool) -> CoreResult<Customer> {
        let customer = self
            .store
            .set_delivering(owner, id, delivering)
            .await?
            .ok_or_else(|| CoreError::NotFoundError(format!("Customer {}", id)))?;

        info!(
            "{} delivery for {} ({})",
            if delivering { "Started" } else { "Stopped" },
            customer.name,
            owner
        );
        Ok(customer)
    }

    pub async fn delete_customer(&self, owner: &OwnerId, id: Uuid) -> CoreResult<CascadeReport> {
        let report = self
            .store
            .delete_customer_cascade(owner, id)
            .await?
            .ok_or_else(|| CoreError::NotFoundError(format!("Customer {}", id)))?;

        info!(
            "Deleted customer {} for {} ({} extra sales, {} non-delivery days, {} settlements)",
            report.customer.name, owner, report.extra_sales, report.non_delivery, report.settlements
        );
        Ok(report)
    }

    /// Calendar and bill of one customer for one month
    pub async fn customer_month(&self, owner: &OwnerId, id: Uuid, period: Period) -> CoreResult<CustomerStatement> {
        let customer = self.get_customer(owner, id).await?;
        let facts = self.load_facts(owner, period).await?;
        Ok(facts.statement(&self.generator(), &customer))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use milkrun_core::repository::{CustomerRepository, DeliveryRepository, ExtraSaleRepository};
    use milkrun_shared::models::{ExtraSaleRecord, NewExtraSale};

    #[tokio::test]
    async fn test_duplicate_name_rejected() {
        let (service, _) = service();
        register(&service, "Asha").await;

        let result = service
            .register_customer(
                &owner(),
                NewCustomer {
                    name: " Asha ".to_string(),
                    phone: "9000000000".to_string(),
                    quantity: Decimal::from(1),
                    price: Decimal::from(40),
                    start_date: june(1),
                },
            )
            .await;
        assert!(matches!(result, Err(CoreError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_same_name_under_other_owner_allowed() {
        let (service, _) = service();
        register(&service, "Asha").await;

        let other = OwnerId::new("other@example.com").unwrap();
        let customer = service
            .register_customer(
                &other,
                NewCustomer {
                    name: "Asha".to_string(),
                    phone: "9000000000".to_string(),
                    quantity: Decimal::from(1),
                    price: Decimal::from(40),
                    start_date: june(1),
                },
            )
            .await
            .unwrap();

        assert_eq!(service.list_customers(&other).await.unwrap(), vec![customer]);
        assert_eq!(service.list_customers(&owner()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_registration() {
        let (service, _) = service();
        let result = service
            .register_customer(
                &owner(),
                NewCustomer {
                    name: "Asha".to_string(),
                    phone: "98-76".to_string(),
                    quantity: Decimal::from(1),
                    price: Decimal::from(40),
                    start_date: june(1),
                },
            )
            .await;
        assert!(matches!(result, Err(CoreError::ValidationError(_))));

        let result = service
            .register_customer(
                &owner(),
                NewCustomer {
                    name: "Asha".to_string(),
                    phone: "9876".to_string(),
                    quantity: Decimal::from(-1),
                    price: Decimal::from(40),
                    start_date: june(1),
                },
            )
            .await;
        assert!(matches!(result, Err(CoreError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_customer_not_visible_to_other_owner() {
        let (service, _) = service();
        let customer = register(&service, "Asha").await;
        let other = OwnerId::new("other@example.com").unwrap();

        let result = service.get_customer(&other, customer.id).await;
        assert!(matches!(result, Err(CoreError::NotFoundError(_))));
        let result = service.delete_customer(&other, customer.id).await;
        assert!(matches!(result, Err(CoreError::NotFoundError(_))));
        assert!(service.get_customer(&owner(), customer.id).await.is_ok());
    }

    #[tokio::test]
    async fn test_rename_carries_records() {
        let (service, store) = service();
        let customer = register(&service, "Asha").await;
        store.set_delivery_status(&owner(), "Asha", june(4), false).await.unwrap();
        store
            .create_extra_sale(&ExtraSaleRecord::new(
                owner().to_string(),
                NewExtraSale {
                    customer_name: "Asha".into(),
                    quantity: Decimal::from(1),
                    date: june(6),
                },
            ))
            .await
            .unwrap();

        let renamed = service
            .update_customer(
                &owner(),
                customer.id,
                CustomerUpdate {
                    name: Some("Asha Devi".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(renamed.name, "Asha Devi");

        let skipped = store.list_non_delivery(&owner(), None).await.unwrap();
        assert_eq!(skipped[0].customer_name, "Asha Devi");
        let sales = store.list_extra_sales(&owner(), None).await.unwrap();
        assert_eq!(sales[0].customer_name, "Asha Devi");
    }

    #[tokio::test]
    async fn test_rename_onto_existing_name_rejected() {
        let (service, _) = service();
        let asha = register(&service, "Asha").await;
        register(&service, "Vikram").await;

        let result = service
            .update_customer(
                &owner(),
                asha.id,
                CustomerUpdate {
                    name: Some("Vikram".into()),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(result, Err(CoreError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_stop_and_start_delivery() {
        let (service, store) = service();
        let customer = register(&service, "Asha").await;

        let stopped = service.set_delivering(&owner(), customer.id, false).await.unwrap();
        assert!(!stopped.is_delivering);
        assert_eq!(store.list_paused_customers().await.unwrap().len(), 1);

        let started = service.set_delivering(&owner(), customer.id, true).await.unwrap();
        assert!(started.is_delivering);
        assert!(store.list_paused_customers().await.unwrap().is_empty());
    }
}
