//! Binary and image builds.
//! Each selected definition is turned into a list of [`ToolCommand`]s
//! (`go build`, `docker build/pull/tag/push`) which are then run in order.

use crate::config::{BinaryDefinition, ImageDefinition};
use crate::error::{Error, Result};
use crate::info::BuildInfo;
use crate::logger::title;
use crate::runner::{CommandRunner, ToolCommand};
use crate::workspace::Workspace;
use log::info;
use std::path::{Path, PathBuf};

/// Plans the builds of one binary: the host build, then one per platform.
///
/// # Errors
/// * `Error::PlatformError` if a platform is not of the form `<os>/<arch>`
pub fn plan_binary(
    ws: &Workspace,
    binary: &BinaryDefinition,
    info: &BuildInfo,
    output: &Path,
) -> Result<Vec<ToolCommand>> {
    let src = if binary.src.is_empty() {
        Path::new(&ws.env.binary_src).join(&binary.name)
    } else {
        PathBuf::from(&binary.src)
    };

    let mut commands = vec![go_build(ws, info, &binary.name, &src, output, Vec::new())];
    for platform in &binary.platform {
        let (os, arch) = platform
            .split_once('/')
            .filter(|(os, arch)| !os.is_empty() && !arch.is_empty() && !arch.contains('/'))
            .ok_or_else(|| Error::PlatformError(platform.clone()))?;
        let name = format!("{}_{os}_{arch}", binary.name);
        let envs = vec![format!("GOOS={os}"), format!("GOARCH={arch}")];
        commands.push(go_build(ws, info, &name, &src, output, envs));
    }
    Ok(commands)
}

fn go_build(
    ws: &Workspace,
    info: &BuildInfo,
    name: &str,
    src: &Path,
    output: &Path,
    platform_envs: Vec<String>,
) -> ToolCommand {
    ToolCommand::new("go")
        .arg("build")
        .args(ws.env.binary_build_args.iter().cloned())
        .args(info.ldflags())
        .arg("-o")
        .arg(output.join(name).display().to_string())
        .arg(ws.root.join(src).display().to_string())
        .envs(ws.env.binary_build_env.iter().cloned())
        .envs(platform_envs)
        .echo()
}

/// Builds every selected binary of the environment.
///
/// # Arguments
/// * `output` - Output directory, defaults to the environment's `binary_tgt`
pub fn build_binaries(
    ws: &Workspace,
    runner: &dyn CommandRunner,
    info: &BuildInfo,
    output: Option<&Path>,
) -> Result<()> {
    let output = output.map_or_else(|| PathBuf::from(&ws.env.binary_tgt), Path::to_path_buf);
    for binary in ws.select(&ws.env.binaries, &ws.config.build.binaries) {
        let commands = plan_binary(ws, binary, info, &output)?;
        title(
            &ws.env_name,
            &format!("Build Binary {} {}", binary.name, info.version()),
        );
        for command in &commands {
            info!("{command}");
            runner.run(command)?;
        }
    }
    Ok(())
}

/// Plans the build of one image and, when `push` is set, its push.
pub fn plan_image(ws: &Workspace, image: &ImageDefinition, push: bool) -> Vec<ToolCommand> {
    let target = image.image_name(&ws.env);
    let mut commands = Vec::new();

    if !image.build_from.is_empty() {
        commands.push(ToolCommand::new("docker").args(["pull", image.build_from.as_str()]).echo());
        commands.push(
            ToolCommand::new("docker")
                .args(["tag", image.build_from.as_str(), target.as_str()])
                .envs(ws.env.image_build_env.iter().cloned())
                .echo(),
        );
    } else {
        let src = if image.build_src.is_empty() {
            Path::new(&ws.env.image_build_src).join(&image.name)
        } else {
            PathBuf::from(&image.build_src)
        };
        let base = match image.base.strip_prefix('$') {
            Some(other) => ws.config.image_name(other, &ws.env).unwrap_or_default(),
            None => image.base.clone(),
        };
        let build_args = [
            format!("NAME={}", image.name),
            format!("BASE={base}"),
            format!("CONFIG_TGT={}", ws.env.config_tgt),
            format!("CONFIG_DIR={}", ws.config.config_dir(&image.name)),
        ];
        let mut command = ToolCommand::new("docker").args(["build", "-t", target.as_str(), "--no-cache"]);
        for build_arg in build_args {
            command = command.arg("--build-arg").arg(build_arg);
        }
        commands.push(
            command
                .args(ws.env.image_build_args.iter().cloned())
                .arg("-f")
                .arg(ws.root.join(&src).join("Dockerfile").display().to_string())
                .arg(ws.root.display().to_string())
                .envs(ws.env.image_build_env.iter().cloned())
                .echo(),
        );
    }

    if push && !image.no_push {
        commands.push(ToolCommand::new("docker").args(["push", target.as_str()]).echo());
    }
    commands
}

/// Builds every selected image of the environment, pushing when `push` is set
/// and the image allows it.
pub fn build_images(ws: &Workspace, runner: &dyn CommandRunner, push: bool) -> Result<()> {
    for image in ws.select(&ws.env.images, &ws.config.build.images) {
        let target = image.image_name(&ws.env);
        let source = if image.build_from.is_empty() { "Dockerfile" } else { image.build_from.as_str() };
        title(
            &ws.env_name,
            &format!("Build Image {} from {source} as {target}", image.name),
        );
        for command in plan_image(ws, image, push) {
            info!("{command}");
            runner.run(&command)?;
        }
    }
    Ok(())
}
