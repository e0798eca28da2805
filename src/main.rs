#[cfg(target_os = "espidf")]
fn main() {
    use std::thread::sleep;
    use std::time::Duration;

    use esp_bresser_5in1::config::{BuildConfig, TargetPlatform};
    use esp_bresser_5in1::peripherals::EspHost;
    use esp_bresser_5in1::run_build;

    // It is necessary to call this function once. Otherwise some patches to the runtime
    // implemented by esp-idf-sys might not link properly. See https://github.com/esp-rs/esp-idf-template/issues/71
    esp_idf_svc::sys::link_patches();

    // Bind the log crate to the ESP Logging facilities
    esp_idf_svc::log::EspLogger::initialize_default();

    // EspHost 只映射 ESP32-C3 的引脚，按实际芯片校验
    let config = match BuildConfig::from_yaml_str(include_str!("../bresser.yaml")) {
        Ok(config) => config.with_platform(TargetPlatform::Esp32C3),
        Err(e) => {
            log::error!("加载配置失败: {e}");
            return;
        }
    };

    let mut host = match EspHost::new() {
        Ok(host) => host,
        Err(e) => {
            log::error!("创建宿主失败: {e}");
            return;
        }
    };

    if let Err(e) = run_build(&config, &mut host) {
        log::error!("构建失败: {e}");
        return;
    }

    let registry = host.registry_mut();
    registry.setup_all();

    loop {
        registry.poll_all();
        sleep(Duration::from_millis(100));
    }
}

#[cfg(not(target_os = "espidf"))]
fn main() -> anyhow::Result<()> {
    use std::path::PathBuf;

    use anyhow::Context;
    use clap::Parser;
    use esp_bresser_5in1::config::{BuildConfig, TargetPlatform};
    use esp_bresser_5in1::{run_build, BuildHost};
    use tracing_subscriber::EnvFilter;

    /// 校验 Bresser 5-in-1 接收器配置并输出构建清单
    #[derive(Parser, Debug)]
    #[command(name = "esp-bresser-5in1")]
    #[command(version, about, long_about = None)]
    struct Args {
        /// 配置文件路径
        #[arg(env = "BRESSER_CONFIG", default_value = "bresser.yaml")]
        config: PathBuf,

        /// 目标芯片，覆盖配置文件中的 `platform`
        #[arg(short, long)]
        platform: Option<TargetPlatform>,
    }

    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let mut config = BuildConfig::from_file(&args.config)
        .with_context(|| format!("无法加载 {}", args.config.display()))?;
    if let Some(platform) = args.platform {
        config = config.with_platform(platform);
    }

    let mut host = BuildHost::new(config.platform);
    let summary = run_build(&config, &mut host)?;
    host.registry_mut().setup_all();

    print!("{}", serde_yaml::to_string(&summary)?);
    print!("{}", serde_yaml::to_string(host.manifest())?);
    Ok(())
}
