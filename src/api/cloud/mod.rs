//
//  tf-collect
//  api/cloud/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/18.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Bitbucket Cloud API v2.0.
//!
//! Repositories are listed per workspace; pagination follows the absolute
//! `next` URL of each page.

pub mod repositories;

pub use repositories::{Repository, RepositoryLinks};
