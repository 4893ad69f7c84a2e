//! Offer validation rules

use std::sync::Arc;

use super::resource::ResourceSchemas;
use crate::core::store::Store;
use crate::core::validation::{FieldRules, MustExist};
use crate::entities::{Offer, Publication, User};

/// Body rules of an offer. Both references must resolve to live records.
pub fn body_fields(
    users: Arc<dyn Store<User>>,
    publications: Arc<dyn Store<Publication>>,
    partial: bool,
) -> Vec<FieldRules> {
    vec![
        FieldRules::body("message", "Message")
            .optional_if(partial)
            .required()
            .not_empty()
            .text(),
        FieldRules::body("geolocation", "Geolocation")
            .optional_if(partial)
            .required()
            .not_empty()
            .text(),
        FieldRules::body("bid", "Bid")
            .optional_if(partial)
            .required()
            .not_empty()
            .numeric(),
        FieldRules::body("weight", "Weight")
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
        FieldRules::body("publicationId", "Publication Id")
            .optional_if(partial)
            .required()
            .not_empty()
            .record_id()
            .lookup(MustExist::new(publications, "Publication is not defined")),
        FieldRules::body("isActive", "Is active").optional().boolean(),
    ]
}

/// Query rules for listing offers
pub fn list_fields() -> Vec<FieldRules> {
    vec![
        FieldRules::query("message").optional().text(),
        FieldRules::query("geolocation").optional().text(),
        FieldRules::query("isActive").optional().boolean(),
    ]
}

/// All operation schemas of the offer resource
pub fn schemas(
    users: Arc<dyn Store<User>>,
    publications: Arc<dyn Store<Publication>>,
) -> ResourceSchemas {
    ResourceSchemas::build::<Offer>(
        move |partial| body_fields(users.clone(), publications.clone(), partial),
        list_fields(),
    )
}
