//! Validation helpers for API contract types

use crate::error::ApiContractError;
use crate::types::*;
use validator::Validate;

/// Validate a processor component before creation
pub fn validate_processor_component(
    component: &ProcessorComponent,
) -> Result<(), ApiContractError> {
    component.validate()?;
    Ok(())
}

/// Validate a connection component before creation
pub fn validate_connection_component(
    component: &ConnectionComponent,
) -> Result<(), ApiContractError> {
    component.validate()?;

    if component.selected_relationships.iter().any(|r| r.trim().is_empty()) {
        return Err(ApiContractError::BlankRelationship);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn processor(name: &str, processor_type: &str) -> ProcessorComponent {
        ProcessorComponent {
            id: None,
            parent_group_id: None,
            processor_type: processor_type.to_string(),
            name: name.to_string(),
            position: Some(Position::new(300.0, 200.0)),
            config: None,
            state: None,
        }
    }

    #[test]
    fn test_validate_processor_component_valid() {
        let component = processor(
            "Generate Sample Data",
            "org.apache.nifi.processors.standard.GenerateFlowFile",
        );
        assert!(validate_processor_component(&component).is_ok());
    }

    #[test]
    fn test_validate_processor_component_empty_name() {
        let component = processor("", "org.apache.nifi.processors.standard.GenerateFlowFile");
        assert!(matches!(
            validate_processor_component(&component),
            Err(ApiContractError::Validation(_))
        ));
    }

    #[test]
    fn test_validate_connection_requires_relationship() {
        let component = ConnectionComponent {
            id: None,
            source: Connectable::processor("a", "g"),
            destination: Connectable::processor("b", "g"),
            selected_relationships: vec![],
        };
        assert!(validate_connection_component(&component).is_err());
    }

    #[test]
    fn test_validate_connection_rejects_blank_relationship() {
        let component = ConnectionComponent {
            id: None,
            source: Connectable::processor("a", "g"),
            destination: Connectable::processor("b", "g"),
            selected_relationships: vec!["success".into(), "  ".into()],
        };
        assert!(matches!(
            validate_connection_component(&component),
            Err(ApiContractError::BlankRelationship)
        ));
    }

    #[test]
    fn test_validate_connection_rejects_empty_endpoint() {
        let component = ConnectionComponent {
            id: None,
            source: Connectable::processor("", "g"),
            destination: Connectable::processor("b", "g"),
            selected_relationships: vec!["success".into()],
        };
        assert!(validate_connection_component(&component).is_err());
    }
}
