use std::env;
use std::process::Command;

// CPU features the packet types can use
#[derive(PartialEq, Eq, Debug)]
struct CpuFeature {
    name: &'static str,
    rustc_flag: &'static str,
    detected: bool,
}

impl CpuFeature {
    fn features() -> Vec<CpuFeature> {
        vec![CpuFeature {
            name: "avx",
            rustc_flag: "+avx",
            detected: false,
        }]
    }
}

trait CpuFeatureDetector {
    fn detect_features(&self, features: &mut [CpuFeature]);
    fn is_applicable(&self) -> bool;
}

struct LinuxDetector;
impl CpuFeatureDetector for LinuxDetector {
    fn detect_features(&self, features: &mut [CpuFeature]) {
        if let Ok(cpuinfo) = std::fs::read_to_string("/proc/cpuinfo") {
            let contents = cpuinfo.to_lowercase();
            // "avx" is a prefix of several other flags, so match whole tokens.
            let flags: Vec<&str> = contents
                .lines()
                .filter(|line| line.starts_with("flags"))
                .flat_map(|line| line.split_whitespace())
                .collect();
            for feature in features.iter_mut() {
                feature.detected = flags.contains(&feature.name);
            }
        }
    }

    fn is_applicable(&self) -> bool {
        cfg!(target_os = "linux")
    }
}

struct MacOSDetector;
impl CpuFeatureDetector for MacOSDetector {
    fn detect_features(&self, features: &mut [CpuFeature]) {
        let output = Command::new("sysctl").args(["-a"]).output();

        if let Ok(output) = output {
            let contents = String::from_utf8_lossy(&output.stdout).to_lowercase();

            for feature in features.iter_mut() {
                if feature.name == "avx" {
                    feature.detected = contents.contains("hw.optional.avx1_0: 1");
                }
            }
        }
    }

    fn is_applicable(&self) -> bool {
        cfg!(target_os = "macos")
    }
}

struct PlatformDetector;
impl PlatformDetector {
    fn cpu_features_detectors() -> Vec<Box<dyn CpuFeatureDetector>> {
        vec![Box::new(LinuxDetector), Box::new(MacOSDetector)]
    }

    fn detect_cpu_features(features: &mut [CpuFeature]) {
        for detector in Self::cpu_features_detectors() {
            if detector.is_applicable() {
                detector.detect_features(features);
                break;
            }
        }
    }

    // The packets are selected with `cfg(target_feature)`, which a build
    // script cannot turn on. Point at features the host has but the
    // compilation leaves disabled.
    fn report(features: &[CpuFeature], target_features: &str) {
        let enabled: Vec<&str> = target_features.split(',').collect();
        for feature in features {
            if feature.detected && !enabled.contains(&feature.name) {
                println!(
                    "cargo:warning=host supports {} but it is not enabled; \
                     build with RUSTFLAGS=\"-C target-feature={}\" or \
                     \"-C target-cpu=native\" for the vectorised f32 kernel",
                    feature.name, feature.rustc_flag
                );
            }
        }
    }
}

fn main() {
    println!("cargo::rerun-if-changed=build.rs");
    println!("cargo::rerun-if-env-changed=RUSTFLAGS");

    let host = env::var("HOST").unwrap_or_default();
    let target = env::var("TARGET").unwrap_or_default();
    let target_arch = env::var("CARGO_CFG_TARGET_ARCH").unwrap_or_default();
    let target_features = env::var("CARGO_CFG_TARGET_FEATURE").unwrap_or_default();

    // Only trust host detection when the binary runs where it is built
    if host != target || !(target_arch == "x86" || target_arch == "x86_64") {
        return;
    }

    let mut features = CpuFeature::features();
    PlatformDetector::detect_cpu_features(&mut features);
    PlatformDetector::report(&features, &target_features);
}
