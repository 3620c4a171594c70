/* This file is part of the DERSFLIX project
*
*  Copyright (C) 2025-2026 The DERSFLIX contributors
*  
*  This program is free software: you can redistribute it and/or modify
*  it under the terms of the GNU Affero General Public License as published by
*  the Free Software Foundation, either version 3 of the License, or
*  (at your option) any later version.
*
*  This program is distributed in the hope that it will be useful,
*  but WITHOUT ANY WARRANTY; without even the implied warranty of
*  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
*  GNU Affero General Public License for more details.
*
*  You should have received a copy of the GNU Affero General Public License
*  along with this program.  If not, see <https://www.gnu.org/licenses/>.
*/

use std::{env, fs::File, io::{BufWriter, Write}, path::Path};

use chrono::{DateTime, FixedOffset, TimeZone};
use cloneable_errors::{bail, ErrContext, ErrorContext, ResContext};
use git2::{ErrorClass, ErrorCode, Repository};

fn main() -> Result<(), ErrorContext> {
    let out_dir = env::var("OUT_DIR").context("OUT_DIR not set")?;
    let manifest_dir = env::var("CARGO_MANIFEST_DIR").context("CARGO_MANIFEST_DIR not set")?;
    let built_file = Path::new(&out_dir).join("built.rs");
    let manifest_dir = Path::new(&manifest_dir);

    built::write_built_file_with_opts(Some(manifest_dir), &built_file)
        .context("Failed to generate build-time info")?;

    let commit = last_commit_time(manifest_dir).context("Failed to read the last commit time")?;
    let file = File::options().append(true).open(&built_file).context("Failed to reopen the build-time info file")?;
    write_commit_time(&mut BufWriter::new(file), commit.as_ref()).context("Failed to append the commit time")?;
    Ok(())
}

/// `None` when building outside of a git checkout
fn last_commit_time(manifest_dir: &Path) -> Result<Option<DateTime<FixedOffset>>, ErrorContext> {
    let repo = match Repository::discover(manifest_dir) {
        Ok(repo) => repo,
        Err(e) if e.class() == ErrorClass::Repository && e.code() == ErrorCode::NotFound => return Ok(None),
        Err(e) => return Err(e.context("Failed to open the git repository")),
    };
    let time = repo
        .head().context("Failed to read the repository head")?
        .peel_to_commit().context("Failed to resolve the head to a commit")?
        .time();
    let Some(offset) = FixedOffset::east_opt(time.offset_minutes() * 60) else {
        bail!("Commit has an out of range timezone offset: {} minutes", time.offset_minutes());
    };
    match offset.timestamp_opt(time.seconds(), 0).single() {
        Some(datetime) => Ok(Some(datetime)),
        None => {
            bail!("Commit has an invalid timestamp: {}", time.seconds());
        },
    }
}

fn write_commit_time<W: Write>(out: &mut W, commit: Option<&DateTime<FixedOffset>>) -> Result<(), ErrorContext> {
    let (rfc3339, millis) = match commit {
        None => ("None".to_owned(), "None".to_owned()),
        Some(datetime) => (
            format!("Some(\"{}\")", datetime.to_rfc3339().escape_default()),
            format!("Some({})", datetime.timestamp_millis()),
        ),
    };
    writeln!(out, "\
        #[doc=r\"The commit time in RFC3339/ISO8601.\"]\n\
        #[allow(dead_code)]\n\
        pub const GIT_COMMIT_TIMESTAMP: Option<&str> = {rfc3339};\n\
        #[doc=r\"The commit time as a unix timestamp in milliseconds.\"]\n\
        #[allow(dead_code)]\n\
        pub const GIT_COMMIT_TIMESTAMP_MILLIS: Option<i64> = {millis};"
    ).context("Failed to write to the build-time info file")?;
    out.flush().context("Failed to flush the build-time info file")
}
