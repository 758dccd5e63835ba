pub(crate) mod refresh;

pub(crate) use refresh::{RefreshContext, RefreshParts, refresh_task};
