//! Category commands.

use serde::{Deserialize, Serialize};

use crate::envelope::AuctionCommand;
use crate::result_code::ResultCode;
use crate::validation::{self, ValidationError};

/// Creates a category with a unique name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategory {
    pub name: String,
}

impl CreateCategory {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl AuctionCommand for CreateCategory {
    const TYPE: &'static str = "CreateCategory";
    const RESULT_CODES: &'static [ResultCode] = &[
        ResultCode::CategorySuccessfullyCreated,
        ResultCode::CategoryAlreadyExists,
    ];
    const CREATES_AGGREGATE: bool = true;

    fn validate(&self) -> Result<(), ValidationError> {
        validation::category_name("name", &self.name)
    }
}

/// First step of deleting a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkCategoryForDeletion {
    pub category_id: i64,
}

impl MarkCategoryForDeletion {
    pub fn new(category_id: i64) -> Self {
        Self { category_id }
    }
}

impl AuctionCommand for MarkCategoryForDeletion {
    const TYPE: &'static str = "MarkCategoryForDeletion";
    const RESULT_CODES: &'static [ResultCode] = &[
        ResultCode::CategorySuccessfullyMarkedForDeletion,
        ResultCode::CategoryToMarkNotActive,
        ResultCode::IdNotFound,
    ];

    fn validate(&self) -> Result<(), ValidationError> {
        validation::positive_id("categoryId", self.category_id)
    }
}

/// Deletes a category previously marked for deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteCategory {
    pub category_id: i64,
}

impl DeleteCategory {
    pub fn new(category_id: i64) -> Self {
        Self { category_id }
    }
}

impl AuctionCommand for DeleteCategory {
    const TYPE: &'static str = "DeleteCategory";
    const RESULT_CODES: &'static [ResultCode] = &[
        ResultCode::CategorySuccessfullyDeleted,
        ResultCode::CategoryToDeleteNotMarked,
        ResultCode::IdNotFound,
    ];

    fn validate(&self) -> Result<(), ValidationError> {
        validation::positive_id("categoryId", self.category_id)
    }
}
