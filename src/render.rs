//! Backends executing filter passes.
//!
//! The engine only talks to [`crate::shader::backend::ShaderBackend`]. The CPU backend here is
//! the reference implementation used by tests, demos and hosts without a GPU.

pub mod cpu;
mod kernels;

pub use self::cpu::{CpuBackend, CpuBackendOpts, CpuBackendStats, CpuKernel, KernelArgs};
