use std::path::Path;
use std::sync::{Arc, OnceLock};

use kinema_animation::{AnimationClip, AnimationController, AnimationSettings, ClipHandle, SharedController};
use kinema_core::{KinemaError, Result};
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use tokio::runtime::Runtime;

use crate::format::{parse_clip, parse_controller_with_settings, write_clip, write_controller};
use crate::io::FileAssetReader;

fn get_asset_runtime() -> &'static Runtime {
    static RUNTIME: OnceLock<Runtime> = OnceLock::new();
    RUNTIME.get_or_init(|| Runtime::new().expect("Failed to create asset loader runtime"))
}

/// Clip cache plus background loader.
///
/// Cloning is cheap and every clone shares the same cache. Clips are keyed
/// by the path they were requested with, so every state naming the same
/// file shares one [`ClipHandle`].
#[derive(Clone)]
pub struct AssetServer {
    reader: Arc<FileAssetReader>,
    clips: Arc<RwLock<FxHashMap<String, ClipHandle>>>,
    settings: AnimationSettings,
}

impl AssetServer {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self::with_settings(root, AnimationSettings::default())
    }

    /// `settings` are handed to every controller this server loads.
    pub fn with_settings(root: impl AsRef<Path>, settings: AnimationSettings) -> Self {
        Self {
            reader: Arc::new(FileAssetReader::new(root)),
            clips: Arc::new(RwLock::new(FxHashMap::default())),
            settings,
        }
    }

    #[inline]
    #[must_use]
    pub fn root_path(&self) -> &Path {
        self.reader.root_path()
    }

    #[inline]
    #[must_use]
    pub fn settings(&self) -> &AnimationSettings {
        &self.settings
    }

    // ========================================================================
    // Clips
    // ========================================================================

    /// Returns the cached handle for `path`, or a pending one whose clip is
    /// read and parsed on the asset runtime.
    ///
    /// Poll [`ClipHandle::is_loaded`] / [`ClipHandle::has_failed`]; until
    /// then animators sample the bind pose.
    pub fn get_or_load_clip(&self, path: &str) -> ClipHandle {
        if let Some(handle) = self.clips.read().get(path) {
            return handle.clone();
        }

        let handle = {
            let mut clips = self.clips.write();
            if let Some(handle) = clips.get(path) {
                return handle.clone();
            }
            let handle = ClipHandle::pending(path);
            clips.insert(path.to_string(), handle.clone());
            handle
        };

        let reader = Arc::clone(&self.reader);
        let task_handle = handle.clone();
        let uri = path.to_string();
        get_asset_runtime().spawn(async move {
            match load_clip_async(&reader, &uri).await {
                Ok(clip) => {
                    log::debug!("Loaded clip '{}' from '{uri}'", clip.name);
                    task_handle.publish(clip);
                }
                Err(err) => {
                    log::error!("Failed to load clip '{uri}': {err}");
                    task_handle.fail();
                }
            }
        });

        handle
    }

    /// Loads `path` on the calling thread.
    ///
    /// A pending handle already in the cache is filled in by this load, so
    /// states holding it see the clip too. A failed one is replaced.
    pub fn load_clip_blocking(&self, path: &str) -> Result<ClipHandle> {
        if let Some(handle) = self.cached_clip(path)
            && handle.is_loaded()
        {
            return Ok(handle);
        }

        let clip = get_asset_runtime().block_on(load_clip_async(&self.reader, path))?;

        let mut clips = self.clips.write();
        match clips.get(path) {
            Some(handle) if !handle.has_failed() => {
                if !handle.is_loaded() {
                    handle.publish(clip);
                }
                Ok(handle.clone())
            }
            _ => {
                let handle = ClipHandle::ready(path, clip);
                clips.insert(path.to_string(), handle.clone());
                Ok(handle)
            }
        }
    }

    /// Registers an in-memory clip under `path`, replacing any cached one.
    pub fn insert_clip(&self, path: &str, clip: AnimationClip) -> ClipHandle {
        let handle = ClipHandle::ready(path, clip);
        self.clips.write().insert(path.to_string(), handle.clone());
        handle
    }

    #[must_use]
    pub fn cached_clip(&self, path: &str) -> Option<ClipHandle> {
        self.clips.read().get(path).cloned()
    }

    #[must_use]
    pub fn clip_count(&self) -> usize {
        self.clips.read().len()
    }

    /// Number of cached clips that are neither loaded nor failed.
    #[must_use]
    pub fn pending_clip_count(&self) -> usize {
        self.clips
            .read()
            .values()
            .filter(|handle| !handle.is_loaded() && !handle.has_failed())
            .count()
    }

    pub fn save_clip(&self, clip: &AnimationClip, path: &str) -> Result<()> {
        get_asset_runtime().block_on(self.reader.write(path, write_clip(clip)))
    }

    // ========================================================================
    // Controllers
    // ========================================================================

    /// Parses a controller file. Every clip path it names goes through
    /// [`get_or_load_clip`](Self::get_or_load_clip), so the controller is
    /// returned before its clips finish loading.
    pub fn load_controller(&self, path: &str) -> Result<SharedController> {
        let text = get_asset_runtime().block_on(self.reader.read_to_string(path))?;
        let controller =
            parse_controller_with_settings(&text, self.settings, |clip| self.get_or_load_clip(clip))
                .map_err(|err| KinemaError::AssetLoadFailed {
                    path: path.to_string(),
                    reason: err.to_string(),
                })?;
        log::info!(
            "Loaded controller '{}' from '{path}' ({} clips cached)",
            controller.name(),
            self.clip_count()
        );
        Ok(controller.into_shared())
    }

    pub fn save_controller(&self, controller: &AnimationController, path: &str) -> Result<()> {
        get_asset_runtime().block_on(self.reader.write(path, write_controller(controller)))
    }
}

async fn load_clip_async(reader: &FileAssetReader, uri: &str) -> Result<AnimationClip> {
    let text = reader.read_to_string(uri).await?;
    let clip = tokio::task::spawn_blocking(move || parse_clip(&text))
        .await
        .map_err(|err| KinemaError::TaskJoinError(err.to_string()))?;
    clip.map_err(|err| KinemaError::AssetLoadFailed {
        path: uri.to_string(),
        reason: err.to_string(),
    })
}
