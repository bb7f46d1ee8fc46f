mod bundles;
mod common;
