//! Domain entities for SmartLink provisioning.
//!
//! This module contains pure business data with no infrastructure
//! dependencies: the provisioning request and the validation rules the
//! protocol imposes on it. Code here can be compiled and tested on any
//! platform without any external setup.

/// Provisioning request entity and validation.
///
/// See [`request::ProvisioningRequest`] for the main type.
pub mod request;
