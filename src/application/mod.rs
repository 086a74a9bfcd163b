// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// Workflow coordination only: no tensor code, no printing.
//
//   train_use_case.rs   — load, build, restore, run the loop
//   inspect_use_case.rs — bucket counts and sampling table,
//                         without training
//
// Reference: Clean Architecture pattern
//            Rust Book §7 (Module System)

// The training workflow
pub mod train_use_case;

// Dataset / bucket inspection
pub mod inspect_use_case;
