//! Generic resource client.
//!
//! One client covers every conventional CRUD resource; per-resource typed
//! facades instantiate it with their [`ResourceDescriptor`] and expose only
//! the operations the server supports for that resource.

use serde_json::Value;
use std::sync::Arc;

use crate::cancel::CancelToken;
use crate::transport::{RequestSpec, Transport, TransportFuture};

/// Operations a resource family supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Operations {
  pub create: bool,
  pub list: bool,
  pub get: bool,
  pub update: bool,
  pub delete: bool,
}

impl Operations {
  /// Full create/list/get/update/delete surface.
  pub const CRUD: Self = Self {
    create: true,
    list: true,
    get: true,
    update: true,
    delete: true,
  };

  pub const fn new(create: bool, list: bool, get: bool, update: bool, delete: bool) -> Self {
    Self {
      create,
      list,
      get,
      update,
      delete,
    }
  }
}

/// Identifies one server resource family.
#[derive(Debug, Clone, Copy)]
pub struct ResourceDescriptor {
  /// Name used in logs and diagnostics.
  pub name: &'static str,
  /// Collection path; always ends with `/`.
  pub path: &'static str,
  /// Operations the server exposes for this resource.
  pub operations: Operations,
}

impl ResourceDescriptor {
  pub const fn new(name: &'static str, path: &'static str, operations: Operations) -> Self {
    Self {
      name,
      path,
      operations,
    }
  }

  /// Path of one item: collection path + id.
  pub fn item_path(&self, id: i64) -> String {
    format!("{}{}", self.path, id)
  }
}

/// Request builders for one resource family over a shared transport.
///
/// Methods are plain functions returning the transport future, so the
/// orchestration layer can re-invoke them per retry - every attempt builds a
/// fresh [`RequestSpec`] from the same inputs.
#[derive(Clone)]
pub struct ResourceClient {
  transport: Arc<dyn Transport>,
  descriptor: ResourceDescriptor,
}

impl ResourceClient {
  pub fn new(transport: Arc<dyn Transport>, descriptor: ResourceDescriptor) -> Self {
    Self {
      transport,
      descriptor,
    }
  }

  pub fn descriptor(&self) -> &ResourceDescriptor {
    &self.descriptor
  }

  /// POST to the collection path.
  pub fn create(&self, body: Value, cancel: CancelToken) -> TransportFuture {
    debug_assert!(self.descriptor.operations.create);
    self
      .transport
      .send(RequestSpec::post(self.descriptor.path, body), cancel)
  }

  /// GET the collection path; parameters pass through uninterpreted.
  pub fn list(&self, query: Vec<(String, String)>, cancel: CancelToken) -> TransportFuture {
    debug_assert!(self.descriptor.operations.list);
    self
      .transport
      .send(RequestSpec::get_with_query(self.descriptor.path, query), cancel)
  }

  /// GET one item by id.
  pub fn get(&self, id: i64, cancel: CancelToken) -> TransportFuture {
    debug_assert!(self.descriptor.operations.get);
    self
      .transport
      .send(RequestSpec::get(self.descriptor.item_path(id)), cancel)
  }

  /// PUT one item by id.
  pub fn update(&self, id: i64, body: Value, cancel: CancelToken) -> TransportFuture {
    debug_assert!(self.descriptor.operations.update);
    self
      .transport
      .send(RequestSpec::put(self.descriptor.item_path(id), body), cancel)
  }

  /// DELETE one item by id.
  pub fn delete(&self, id: i64, cancel: CancelToken) -> TransportFuture {
    debug_assert!(self.descriptor.operations.delete);
    self
      .transport
      .send(RequestSpec::delete(self.descriptor.item_path(id)), cancel)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_item_path_appends_id() {
    let descriptor = ResourceDescriptor::new("budgets", "/budgets/", Operations::CRUD);
    assert_eq!(descriptor.item_path(42), "/budgets/42");
    assert_eq!(descriptor.item_path(7), "/budgets/7");
  }
}
