//! Node ids and destination addresses.
//!
//! Both share the grammar `<serviceName>[:<instanceId>]`. Segments must be
//! non-empty and contain neither `:` nor whitespace.

use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::ValidationError;

fn parse_segments(
    field: &str,
    raw: &str,
) -> Result<(String, Option<String>), ValidationError> {
    if raw.is_empty() {
        return Err(ValidationError::empty_field(field));
    }

    let (service, instance) = match raw.split_once(':') {
        Some((service, instance)) => (service, Some(instance)),
        None => (raw, None),
    };

    check_segment(field, "service name", service)?;
    if let Some(instance) = instance {
        check_segment(field, "instance id", instance)?;
    }

    Ok((service.to_string(), instance.map(str::to_string)))
}

fn check_segment(field: &str, what: &str, segment: &str) -> Result<(), ValidationError> {
    if segment.is_empty() {
        return Err(ValidationError::invalid_format(
            field,
            format!("{} is empty", what),
        ));
    }
    if segment.contains(':') {
        return Err(ValidationError::invalid_format(
            field,
            format!("{} contains ':'", what),
        ));
    }
    if segment.chars().any(char::is_whitespace) {
        return Err(ValidationError::invalid_format(
            field,
            format!("{} contains whitespace", what),
        ));
    }
    Ok(())
}

fn write_address(f: &mut fmt::Formatter<'_>, service: &str, instance: Option<&str>) -> fmt::Result {
    match instance {
        Some(instance) => write!(f, "{}:{}", service, instance),
        None => write!(f, "{}", service),
    }
}

/// Identity of one running service instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodeId {
    service: String,
    instance: Option<String>,
}

impl NodeId {
    /// Parses `service[:instance]`.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let (service, instance) = parse_segments("node_id", raw)?;
        Ok(Self { service, instance })
    }

    /// Builds a node id from separate parts, validating both.
    pub fn new(
        service: impl Into<String>,
        instance: Option<String>,
    ) -> Result<Self, ValidationError> {
        let service = service.into();
        check_segment("node_id", "service name", &service)?;
        if let Some(instance) = &instance {
            check_segment("node_id", "instance id", instance)?;
        }
        Ok(Self { service, instance })
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    pub fn instance(&self) -> Option<&str> {
        self.instance.as_deref()
    }

    /// Returns a copy with the given instance id when none is set.
    pub fn with_default_instance(self, instance: impl Into<String>) -> Result<Self, ValidationError> {
        if self.instance.is_some() {
            return Ok(self);
        }
        Self::new(self.service, Some(instance.into()))
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_address(f, &self.service, self.instance.as_deref())
    }
}

impl FromStr for NodeId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Target of a non-broadcast envelope.
///
/// `svc` matches every instance of `svc`; `svc:1` matches only instance `1`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Destination {
    service: String,
    instance: Option<String>,
}

impl Destination {
    /// Parses `service[:instance]`.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let (service, instance) = parse_segments("destination_service", raw)?;
        Ok(Self { service, instance })
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    pub fn instance(&self) -> Option<&str> {
        self.instance.as_deref()
    }

    /// Returns true if the node with `id` should receive envelopes sent here.
    pub fn matches(&self, id: &NodeId) -> bool {
        if self.service != id.service() {
            return false;
        }
        match &self.instance {
            None => true,
            Some(instance) => id.instance() == Some(instance.as_str()),
        }
    }
}

/// Addresses exactly that node (or every instance, if it has none).
impl From<&NodeId> for Destination {
    fn from(id: &NodeId) -> Self {
        Self {
            service: id.service.clone(),
            instance: id.instance.clone(),
        }
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_address(f, &self.service, self.instance.as_deref())
    }
}

impl FromStr for Destination {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Returns true if an envelope with this destination is for `id`.
///
/// An absent destination is a broadcast and matches every node.
pub fn is_addressed_to(destination: Option<&Destination>, id: &NodeId) -> bool {
    destination.map_or(true, |d| d.matches(id))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(raw: &str) -> NodeId {
        NodeId::parse(raw).unwrap()
    }

    #[test]
    fn parses_service_only() {
        let id = node("producer");
        assert_eq!(id.service(), "producer");
        assert_eq!(id.instance(), None);
        assert_eq!(id.to_string(), "producer");
    }

    #[test]
    fn parses_service_and_instance() {
        let dest = Destination::parse("consumer:2").unwrap();
        assert_eq!(dest.service(), "consumer");
        assert_eq!(dest.instance(), Some("2"));
        assert_eq!(dest.to_string(), "consumer:2");
    }

    #[test]
    fn rejects_malformed_addresses() {
        assert_eq!(
            Destination::parse(""),
            Err(ValidationError::empty_field("destination_service"))
        );
        assert!(Destination::parse(":1").is_err());
        assert!(Destination::parse("svc:").is_err());
        assert!(Destination::parse("svc:1:2").is_err());
        assert!(Destination::parse("my svc").is_err());
        assert!(NodeId::new("", None).is_err());
    }

    #[test]
    fn service_destination_matches_any_instance() {
        let dest = Destination::parse("svcA").unwrap();
        assert!(dest.matches(&node("svcA:1")));
        assert!(dest.matches(&node("svcA:2")));
        assert!(dest.matches(&node("svcA")));
        assert!(!dest.matches(&node("svcB:1")));
    }

    #[test]
    fn instance_destination_matches_only_that_instance() {
        let dest = Destination::parse("svcA:1").unwrap();
        assert!(dest.matches(&node("svcA:1")));
        assert!(!dest.matches(&node("svcA:2")));
        assert!(!dest.matches(&node("svcA")));
        assert!(!dest.matches(&node("svcB:1")));
    }

    #[test]
    fn broadcast_matches_everyone() {
        assert!(is_addressed_to(None, &node("anything:7")));
    }

    #[test]
    fn default_instance_only_fills_missing_instance() {
        let filled = node("svc").with_default_instance("abc").unwrap();
        assert_eq!(filled.to_string(), "svc:abc");

        let kept = node("svc:1").with_default_instance("abc").unwrap();
        assert_eq!(kept.to_string(), "svc:1");
    }

    #[test]
    fn destination_from_node_targets_that_node() {
        let destination = Destination::from(&node("svcA:1"));
        assert!(destination.matches(&node("svcA:1")));
        assert!(!destination.matches(&node("svcA:2")));
    }
}
