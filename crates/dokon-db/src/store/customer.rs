//! Customer operations.

use dokon_core::validation::{validate_customer_patch, validate_new_customer};
use dokon_core::{Customer, CustomerPatch, NewCustomer};
use tracing::debug;

use super::{replace_or_prepend, surface, EntityStore};
use crate::error::StoreResult;
use crate::service::{from_row, from_rows, to_row, Query, Table};

impl EntityStore {
    pub(crate) async fn fetch_customers(&self) -> StoreResult<Vec<Customer>> {
        let rows = self
            .service()
            .select(Table::Customers, &Query::newest_first())
            .await
            .map_err(surface("load customers", ""))?;
        Ok(from_rows(rows)?)
    }

    pub async fn add_customer(&mut self, input: &NewCustomer) -> StoreResult<Customer> {
        let input = validate_new_customer(input)?;

        let row = self
            .service()
            .insert(Table::Customers, to_row(&input)?)
            .await
            .map_err(surface("add customer", &input.name))?;
        let customer: Customer = from_row(row)?;

        debug!(id = %customer.id, "Customer added");
        self.customers.insert(0, customer.clone());
        Ok(customer)
    }

    pub async fn update_customer(
        &mut self,
        id: &str,
        patch: &CustomerPatch,
    ) -> StoreResult<Customer> {
        let patch = validate_customer_patch(patch)?;

        let row = self
            .service()
            .update(Table::Customers, id, to_row(&patch)?)
            .await
            .map_err(surface("update customer", id))?;
        let customer: Customer = from_row(row)?;

        debug!(id = %customer.id, "Customer updated");
        replace_or_prepend(&mut self.customers, customer.clone(), |c| c.id == id);
        Ok(customer)
    }

    /// Removes the customer. Past sales keep their `customer_id`.
    pub async fn delete_customer(&mut self, id: &str) -> StoreResult<()> {
        self.service()
            .delete(Table::Customers, id)
            .await
            .map_err(surface("delete customer", id))?;

        debug!(id = %id, "Customer deleted");
        self.customers.retain(|c| c.id != id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::store::fixtures::store;
    use dokon_core::Money;

    fn new_customer(name: &str, phone: &str) -> NewCustomer {
        NewCustomer {
            name: name.to_string(),
            phone: phone.to_string(),
            email: None,
            address: None,
            bonus_points: 0,
            total_purchases: Money::zero(),
        }
    }

    #[tokio::test]
    async fn test_customer_lifecycle() {
        let (mut store, _) = store().await;
        let aziz = store
            .add_customer(&new_customer(" Aziz ", "+998901112233"))
            .await
            .unwrap();
        assert_eq!(aziz.name, "Aziz");
        assert!(!aziz.is_active());

        let patch = CustomerPatch {
            bonus_points: Some(120),
            total_purchases: Some(Money::from_cents(450_000)),
            ..Default::default()
        };
        let updated = store.update_customer(&aziz.id, &patch).await.unwrap();
        assert_eq!(updated.bonus_points, 120);
        assert!(store.customer(&aziz.id).unwrap().is_active());

        store.delete_customer(&aziz.id).await.unwrap();
        assert!(store.customers().is_empty());
    }

    #[tokio::test]
    async fn test_phone_is_required() {
        let (mut store, _) = store().await;
        let err = store.add_customer(&new_customer("Aziz", "")).await.unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
        assert!(store.customers().is_empty());
    }

    #[tokio::test]
    async fn test_bad_email_is_rejected() {
        let (mut store, _) = store().await;
        let mut input = new_customer("Aziz", "+998901112233");
        input.email = Some("not-an-email".to_string());
        assert!(matches!(
            store.add_customer(&input).await,
            Err(StoreError::Validation(_))
        ));
    }
}
