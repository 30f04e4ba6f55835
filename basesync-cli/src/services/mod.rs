// Business logic services layer
//
// Reconciliation logic lives here so it can be driven by the CLI or by any
// other caller that supplies a SchemaStore.

pub mod reconcile;
