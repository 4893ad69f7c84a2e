//! Publication and supply validation rules

use std::sync::Arc;

use super::resource::ResourceSchemas;
use crate::core::entity::Resource;
use crate::core::store::Store;
use crate::core::validation::{FieldRules, MustExist};
use crate::entities::User;

/// Body rules shared by publications and supplies
pub fn body_fields(users: Arc<dyn Store<User>>, partial: bool) -> Vec<FieldRules> {
    vec![
        FieldRules::body("message", "Message")
            .optional_if(partial)
            .required()
            .not_empty()
            .text(),
        FieldRules::body("type", "Type")
            .optional_if(partial)
            .required()
            .not_empty()
            .text(),
        FieldRules::body("geolocation", "Geolocation")
            .optional_if(partial)
            .required()
            .not_empty()
            .text(),
        FieldRules::body("weight", "Weight")
            .optional_if(partial)
            .required()
            .not_empty()
            .numeric(),
        FieldRules::body("price", "Price")
            .optional_if(partial)
            .required()
            .not_empty()
            .numeric(),
        FieldRules::body("userId", "User Id")
            .optional_if(partial)
            .required()
            .not_empty()
            .record_id()
            .lookup(MustExist::new(users, "User is not defined")),
        FieldRules::body("isActive", "Is active").optional().boolean(),
    ]
}

/// Query rules for listing publications or supplies
pub fn list_fields() -> Vec<FieldRules> {
    vec![
        FieldRules::query("message").optional().text(),
        FieldRules::query("type").optional().text(),
        FieldRules::query("isActive").optional().boolean(),
    ]
}

/// All operation schemas of a listing resource
pub fn schemas<T: Resource>(users: Arc<dyn Store<User>>) -> ResourceSchemas {
    ResourceSchemas::build::<T>(
        move |partial| body_fields(users.clone(), partial),
        list_fields(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::{ApiError, Location::Body};
    use crate::core::id::RecordId;
    use crate::core::validation::RequestInput;
    use crate::entities::Publication;
    use crate::storage::InMemoryStore;

    fn users() -> Arc<dyn Store<User>> {
        Arc::new(InMemoryStore::<User>::new())
    }

    #[tokio::test]
    async fn test_create_schema_names_every_missing_field() {
        let schemas = schemas::<Publication>(users());
        assert_eq!(schemas.create.operation(), "createPublication");
        assert_eq!(schemas.list.operation(), "listPublications");

        let mut input = RequestInput::new();
        let Err(ApiError::Validation(errors)) = schemas.create.check(&mut input).await else {
            panic!("expected validation errors");
        };

        for field in ["message", "type", "geolocation", "weight", "price", "userId"] {
            assert!(errors.iter().any(|e| e.param == field), "no error for {}", field);
        }
        assert!(!errors.iter().any(|e| e.param == "isActive"));
    }

    #[tokio::test]
    async fn test_unknown_owner_is_reference_error() {
        let schemas = schemas::<Publication>(users());
        let mut input = RequestInput::new()
            .with(Body, "message", "m")
            .with(Body, "type", "t")
            .with(Body, "geolocation", "g")
            .with(Body, "weight", "1")
            .with(Body, "price", "2")
            .with(Body, "userId", RecordId::new().to_string());

        let Err(ApiError::Validation(errors)) = schemas.create.check(&mut input).await else {
            panic!("expected validation errors");
        };
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].param, "userId");
        assert_eq!(errors[0].msg, "User is not defined");
    }

    #[tokio::test]
    async fn test_update_schema_accepts_empty_body_but_checks_id() {
        let schemas = schemas::<Publication>(users());

        let mut ok = RequestInput::new().with(
            crate::core::error::Location::Params,
            "publicationId",
            RecordId::new().to_string(),
        );
        assert!(schemas.update.check(&mut ok).await.is_ok());

        let mut bad = RequestInput::new().with(
            crate::core::error::Location::Params,
            "publicationId",
            "nope",
        );
        let Err(ApiError::Validation(errors)) = schemas.update.check(&mut bad).await else {
            panic!("expected validation errors");
        };
        assert_eq!(errors[0].msg, "Invalid publicationId");
    }
}
