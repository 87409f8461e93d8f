//! The library code for the `inkpost` blog publisher. A publishing run is
//! incremental: rather than rebuilding the whole site, it looks at the most
//! recent posts and brings the output directory up to date around them.
//!
//! 1. Loading the most recent post source files ([`crate::loader`],
//!    [`crate::post`])
//! 2. Linking each post to its chronological neighbors ([`crate::sequence`])
//! 3. Writing the outputs ([`crate::build`])
//!
//! The third step is made of independent writers. The tag listings
//! ([`crate::category`]) only ever grow and never list a post twice. The
//! archive ([`crate::archive`]) and the feeds ([`crate::feed`]) are rebuilt
//! from scratch every run. Finally the newest post's page and its
//! predecessor's page are re-rendered and the newest page becomes the site's
//! root document ([`crate::publish`]).

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod archive;
pub mod build;
pub mod category;
pub mod config;
pub mod feed;
pub mod loader;
pub mod markdown;
pub mod post;
pub mod publish;
pub mod sequence;
pub mod tag;
pub mod template;
pub mod url;
pub mod write;
