pub mod cancel;
pub mod feedback;
pub mod license;
pub mod path;
pub mod provision;
pub mod spec;
pub mod store;
pub mod sync;
pub mod walk;

pub use cancel::CancelFlag;
pub use feedback::{Feedback, NullSink, ProgressSink};
pub use license::{DEFAULT_LICENSE, LicenseKey, LicenseTemplate, resolve_license};
pub use provision::{ProvisionError, ProvisionReport, provision, readme_content};
pub use spec::{ProjectSpec, SpecError};
pub use store::{
    ContentStore, Identity, RemoteFileHandle, RepoHandle, StoreError, VersionToken,
};
pub use sync::{SyncOptions, SyncOutcome, SyncReport, SyncStatus, synchronize};
pub use walk::{DirectoryWalker, SkipReason, WalkEntry, WalkError, WalkItem};

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
