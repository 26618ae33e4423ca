fn main() {
    precache_build::default_cfg_aliases();
    precache_build::write_embedded_config().expect("precache template values should resolve");
    precache_build::write_listeners().expect("service worker listeners should be written");
}
