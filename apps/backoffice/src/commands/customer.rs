//! # Customer Commands

use tracing::info;

use dokon_core::report::search_customers as search;
use dokon_core::validation::validate_search_query;
use dokon_core::{Customer, CustomerPatch, NewCustomer};

use crate::error::ApiError;
use crate::state::AppState;

/// All customers, newest first.
pub async fn list_customers(state: &AppState) -> Vec<Customer> {
    state.store.read().await.customers().to_vec()
}

/// Searches customers by name, phone or email.
pub async fn search_customers(state: &AppState, query: &str) -> Result<Vec<Customer>, ApiError> {
    let query = validate_search_query(query)?;
    let store = state.store.read().await;
    Ok(search(store.customers(), &query).into_iter().cloned().collect())
}

pub async fn get_customer(state: &AppState, id: &str) -> Result<Customer, ApiError> {
    state
        .store
        .read()
        .await
        .customer(id)
        .cloned()
        .ok_or_else(|| ApiError::not_found("customer", id))
}

pub async fn add_customer(state: &AppState, input: &NewCustomer) -> Result<Customer, ApiError> {
    let customer = state.store.write().await.add_customer(input).await?;
    info!(id = %customer.id, "Customer added");
    Ok(customer)
}

pub async fn update_customer(
    state: &AppState,
    id: &str,
    patch: &CustomerPatch,
) -> Result<Customer, ApiError> {
    Ok(state.store.write().await.update_customer(id, patch).await?)
}

pub async fn delete_customer(state: &AppState, id: &str) -> Result<(), ApiError> {
    state.store.write().await.delete_customer(id).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::state::fixtures::state;
    use dokon_core::Money;

    fn customer(name: &str, phone: &str) -> NewCustomer {
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
    async fn test_add_search_and_update() {
        let (state, _) = state().await;
        let aziz = add_customer(&state, &customer("Aziz Karimov", "+998901112233")).await.unwrap();
        add_customer(&state, &customer("Malika Yusupova", "+998946660011")).await.unwrap();

        let hits = search_customers(&state, "aziz").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(search_customers(&state, "99894").await.unwrap().len(), 1);

        let patch = CustomerPatch {
            bonus_points: Some(120),
            ..Default::default()
        };
        let updated = update_customer(&state, &aziz.id, &patch).await.unwrap();
        assert_eq!(updated.bonus_points, 120);
        assert_eq!(updated.phone, "+998901112233");
    }

    #[tokio::test]
    async fn test_phone_is_required() {
        let (state, _) = state().await;
        let err = add_customer(&state, &customer("Jasur", "")).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert!(list_customers(&state).await.is_empty());
    }
}
