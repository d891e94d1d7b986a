use super::*;
use crate::{
    foundation::core::{TextureFormat, TextureSize},
    shader::backend::TextureAllocator,
    test_support::MockBackend,
};

fn texture(backend: &mut MockBackend) -> Texture {
    backend
        .create_texture(&TextureDescriptor::new(
            TextureSize::new(4, 4),
            TextureFormat::Unorm8,
        ))
        .unwrap()
}

#[test]
fn owned_texture_is_retired_after_dispose_and_last_lease() {
    let mut backend = MockBackend::new();
    let pool = TexturePool::new();
    let managed = ManagedTexture::owned(texture(&mut backend), &pool);

    let lease = managed.lease().unwrap();
    managed.dispose();
    assert!(!managed.is_valid());
    pool.flush(&mut backend);
    assert_eq!(backend.destroyed, 0);

    drop(lease);
    pool.flush(&mut backend);
    assert_eq!(backend.destroyed, 1);
}

#[test]
fn host_texture_is_never_destroyed() {
    let mut backend = MockBackend::new();
    let pool = TexturePool::new();
    let t = texture(&mut backend);
    let managed = ManagedTexture::host(t.clone());
    drop(managed.lease().unwrap());
    drop(managed);
    pool.flush(&mut backend);
    assert_eq!(backend.destroyed, 0);
    assert!(backend.live.contains(&t.id()));
}

#[test]
fn lease_hands_out_the_wrapped_texture() {
    let mut backend = MockBackend::new();
    let t = texture(&mut backend);
    let managed = ManagedTexture::host(t.clone());
    let a = managed.lease().unwrap();
    let b = managed.lease().unwrap();
    assert_eq!(a.id(), t.id());
    assert_eq!(b.id(), t.id());
    assert_eq!(managed.outstanding_leases(), 2);
    assert_eq!(managed.descriptor(), t.descriptor());
}

#[test]
#[should_panic(expected = "contract violation")]
fn lease_after_dispose_panics() {
    let mut backend = MockBackend::new();
    let managed = ManagedTexture::host(texture(&mut backend));
    managed.dispose();
    let _ = managed.lease();
}

#[test]
fn to_filter_reports_texture_descriptor() {
    let mut backend = MockBackend::new();
    let t = texture(&mut backend);
    let managed = Rc::new(ManagedTexture::host(t.clone()));
    let filter = managed.to_filter();
    assert_eq!(filter.output(), t.descriptor());
}
