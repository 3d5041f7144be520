use crate::utils::error::{GuardError, Result};
use std::collections::HashSet;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_positive_number(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(GuardError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(GuardError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_unique_ids(field_name: &str, ids: impl IntoIterator<Item = i32>) -> Result<()> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(GuardError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: id.to_string(),
                reason: "Duplicate id".to_string(),
            });
        }
    }
    Ok(())
}

/// 檢查子資源引用的父資源是否存在
pub fn validate_reference(
    field_name: &str,
    parent_id: i32,
    known_ids: impl IntoIterator<Item = i32>,
) -> Result<()> {
    if known_ids.into_iter().any(|id| id == parent_id) {
        return Ok(());
    }
    Err(GuardError::InvalidConfigValueError {
        field: field_name.to_string(),
        value: parent_id.to_string(),
        reason: "Referenced parent does not exist".to_string(),
    })
}

pub fn validate_required_field<'a, T>(field_name: &str, value: &'a Option<T>) -> Result<&'a T> {
    value.as_ref().ok_or_else(|| GuardError::MissingConfigError {
        field: field_name.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("request_timeout_ms", 5, 1).is_ok());
        assert!(validate_positive_number("request_timeout_ms", 0, 1).is_err());
    }

    #[test]
    fn test_validate_unique_ids() {
        assert!(validate_unique_ids("clusters", [1, 2, 3]).is_ok());
        assert!(validate_unique_ids("clusters", [1, 2, 1]).is_err());
    }

    #[test]
    fn test_validate_reference() {
        assert!(validate_reference("environments.cluster_id", 2, [1, 2]).is_ok());
        assert!(validate_reference("environments.cluster_id", 3, [1, 2]).is_err());
        assert!(validate_reference("environments.cluster_id", 1, []).is_err());
    }

    #[test]
    fn test_validate_required_field() {
        let present = Some(3);
        assert_eq!(*validate_required_field("config", &present).unwrap(), 3);
        let missing: Option<u32> = None;
        assert!(matches!(
            validate_required_field("config", &missing),
            Err(GuardError::MissingConfigError { .. })
        ));
        assert!(validate_non_empty_string("name", "  ").is_err());
    }
}
