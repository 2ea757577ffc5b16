//! Kanban board view-model: stage columns, drag transitions, reconciliation
//! with the server, and the analytics and search derived from the held list.

pub mod analytics;
pub mod client;
pub mod filter;
pub mod state;
pub mod sync;

pub use analytics::{
    average_experience, AverageExperience, PipelineAnalytics, RoleTally, StageTally,
};
pub use client::{ApiError, CandidateApi, HttpCandidateApi};
pub use filter::{SearchFilter, StageFilter};
pub use state::{
    Board, BoardAction, BoardError, CandidateCard, Column, DragLocation, DragOutcome,
    StageChange, Transition,
};
pub use sync::{BoardSync, DragEffect, PendingWrite, WriteOutcome};
