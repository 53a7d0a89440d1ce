//! Docker Engine/Swarm client built on `bollard`.
//!
//! This is the only module that imports `bollard` types into its public
//! surface; every other crate in the workspace talks to Docker exclusively
//! through [`DockerClient`]'s typed, normalized methods.

use std::collections::HashMap;
use std::time::Duration;

use bollard::container::{
    Config as ContainerConfig, KillContainerOptions, ListContainersOptions, LogOutput,
    LogsOptions, RemoveContainerOptions, RestartContainerOptions, StopContainerOptions,
};
use bollard::exec::{CreateExecOptions, StartExecResults};
use bollard::image::{CreateImageOptions, ListImagesOptions};
use bollard::network::{CreateNetworkOptions, ListNetworksOptions};
use bollard::node::ListNodesOptions;
use bollard::secret::{ServiceSpec, ServiceSpecUpdate};
use bollard::service::{ListServicesOptions, UpdateServiceOptions};
use bollard::system::EventsOptions;
use bollard::volume::{CreateVolumeOptions, ListVolumesOptions};
use bollard::Docker;
use futures_util::stream::StreamExt;
use tracing::{debug, warn};

use crate::capabilities::Capabilities;
use crate::error::Error;
use crate::types::*;

/// Owns the single connection pool to one Docker daemon for the life of the process.
pub struct DockerClient {
    docker: Docker,
}

async fn with_deadline<T>(
    deadline: Duration,
    fut: impl std::future::Future<Output = Result<T, bollard::errors::Error>>,
) -> Result<T, Error> {
    match tokio::time::timeout(deadline, fut).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => Err(Error::from_bollard(err)),
        Err(_) => Err(Error::Timeout(deadline)),
    }
}

impl DockerClient {
    /// Connect using `DOCKER_HOST`/TLS environment conventions, matching the
    /// daemon endpoint a Docker CLI install would pick up.
    pub fn connect(docker_host: Option<&str>) -> Result<Self, Error> {
        let docker = match docker_host {
            Some(host) if host.starts_with("unix://") || host.starts_with('/') => {
                Docker::connect_with_socket_defaults()
            }
            Some(host) => Docker::connect_with_http(host, 30, bollard::API_DEFAULT_VERSION),
            None => Docker::connect_with_local_defaults(),
        }
        .map_err(Error::from_bollard)?;

        Ok(Self { docker })
    }

    pub async fn shutdown(&self) {
        debug!("closing docker client");
    }

    /// Probe the daemon for engine/swarm capabilities, used once at startup.
    pub async fn capabilities(&self, deadline: Duration) -> Result<Capabilities, Error> {
        let info = with_deadline(deadline, self.docker.info()).await?;

        let swarm_state = info
            .swarm
            .as_ref()
            .and_then(|s| s.local_node_state)
            .map(|s| format!("{:?}", s).to_lowercase());

        let is_swarm_active = swarm_state.as_deref() == Some("active");
        let is_manager = info
            .swarm
            .as_ref()
            .and_then(|s| s.control_available)
            .unwrap_or(false);

        Ok(Capabilities {
            engine: true,
            swarm_manager: is_swarm_active && is_manager,
            swarm_worker_or_manager: is_swarm_active,
        })
    }

    // ---- containers ----

    pub async fn list_containers(
        &self,
        filters: HashMap<String, Vec<String>>,
        all: bool,
        limit: Option<isize>,
        deadline: Duration,
    ) -> Result<Vec<ContainerSummary>, Error> {
        let options = ListContainersOptions {
            all,
            limit,
            filters,
            ..Default::default()
        };

        let summaries = with_deadline(deadline, self.docker.list_containers(Some(options))).await?;

        Ok(summaries
            .into_iter()
            .map(|c| ContainerSummary {
                id: c.id.unwrap_or_default(),
                names: c.names.unwrap_or_default(),
                image: c.image.unwrap_or_default(),
                state: c.state.unwrap_or_default(),
                status: c.status.unwrap_or_default(),
                labels: c.labels.unwrap_or_default(),
                created: c.created.unwrap_or_default(),
            })
            .collect())
    }

    pub async fn get_container(
        &self,
        id_or_name: &str,
        deadline: Duration,
    ) -> Result<ContainerDetail, Error> {
        let inspect = with_deadline(deadline, self.docker.inspect_container(id_or_name, None)).await?;

        let state = inspect.state.clone().unwrap_or_default();
        let config = inspect.config.clone().unwrap_or_default();

        Ok(ContainerDetail {
            id: inspect.id.unwrap_or_default(),
            name: inspect.name.unwrap_or_default(),
            image: config.image.unwrap_or_default(),
            state: state.status.map(|s| format!("{:?}", s)).unwrap_or_default(),
            running: state.running.unwrap_or(false),
            exit_code: state.exit_code,
            started_at: state.started_at,
            finished_at: state.finished_at,
            labels: config.labels.unwrap_or_default(),
            mounts: inspect
                .mounts
                .unwrap_or_default()
                .into_iter()
                .filter_map(|m| m.destination)
                .collect(),
        })
    }

    pub async fn lifecycle(
        &self,
        id_or_name: &str,
        action: LifecycleAction,
        options: LifecycleOptions,
        deadline: Duration,
    ) -> Result<(), Error> {
        match action {
            LifecycleAction::Start => {
                with_deadline(deadline, self.docker.start_container::<String>(id_or_name, None)).await
            }
            LifecycleAction::Stop => {
                let opts = StopContainerOptions {
                    t: options.timeout_secs.unwrap_or(10),
                };
                with_deadline(deadline, self.docker.stop_container(id_or_name, Some(opts))).await
            }
            LifecycleAction::Restart => {
                let opts = RestartContainerOptions {
                    t: options.timeout_secs.unwrap_or(10),
                };
                with_deadline(deadline, self.docker.restart_container(id_or_name, Some(opts))).await
            }
            LifecycleAction::Pause => with_deadline(deadline, self.docker.pause_container(id_or_name)).await,
            LifecycleAction::Unpause => {
                with_deadline(deadline, self.docker.unpause_container(id_or_name)).await
            }
            LifecycleAction::Kill => {
                let opts = KillContainerOptions {
                    signal: options.signal.unwrap_or_else(|| "SIGKILL".to_string()),
                };
                with_deadline(deadline, self.docker.kill_container(id_or_name, Some(opts))).await
            }
            LifecycleAction::Remove => {
                let opts = RemoveContainerOptions {
                    force: options.force.unwrap_or(false),
                    ..Default::default()
                };
                with_deadline(deadline, self.docker.remove_container(id_or_name, Some(opts))).await
            }
        }
    }

    pub async fn logs(
        &self,
        id_or_name: &str,
        options: LogOptions,
        deadline: Duration,
    ) -> Result<String, Error> {
        let opts = LogsOptions::<String> {
            stdout: true,
            stderr: true,
            tail: options.tail.unwrap_or_else(|| "all".to_string()),
            since: options.since.unwrap_or(0),
            until: options.until.unwrap_or(0),
            timestamps: options.timestamps.unwrap_or(false),
            follow: false,
            ..Default::default()
        };

        let mut stream = self.docker.logs(id_or_name, Some(opts));
        let mut out = String::new();

        let collect = async {
            while let Some(chunk) = stream.next().await {
                match chunk {
                    Ok(LogOutput::StdOut { message } | LogOutput::StdErr { message }) => {
                        out.push_str(&String::from_utf8_lossy(&message));
                    }
                    Ok(_) => {}
                    Err(err) => return Err(err),
                }
            }
            Ok(())
        };

        tokio::time::timeout(deadline, collect)
            .await
            .map_err(|_| Error::Timeout(deadline))?
            .map_err(Error::from_bollard)?;

        Ok(out)
    }

    pub async fn exec(
        &self,
        id_or_name: &str,
        argv: Vec<String>,
        options: ExecOptions,
        deadline: Duration,
    ) -> Result<ExecReport, Error> {
        let create_opts = CreateExecOptions {
            cmd: Some(argv),
            attach_stdout: Some(true),
            attach_stderr: Some(true),
            user: options.user,
            working_dir: options.workdir,
            env: Some(options.env),
            ..Default::default()
        };

        let created = with_deadline(deadline, self.docker.create_exec(id_or_name, create_opts)).await?;

        let mut stdout = String::new();
        let mut stderr = String::new();

        let run = async {
            match self.docker.start_exec(&created.id, None).await? {
                StartExecResults::Attached { mut output, .. } => {
                    while let Some(chunk) = output.next().await {
                        match chunk? {
                            LogOutput::StdOut { message } => {
                                stdout.push_str(&String::from_utf8_lossy(&message))
                            }
                            LogOutput::StdErr { message } => {
                                stderr.push_str(&String::from_utf8_lossy(&message))
                            }
                            _ => {}
                        }
                    }
                }
                StartExecResults::Detached => {}
            }
            Ok(())
        };

        tokio::time::timeout(deadline, run)
            .await
            .map_err(|_| Error::Timeout(deadline))?
            .map_err(Error::from_bollard)?;

        let inspect = with_deadline(deadline, self.docker.inspect_exec(&created.id)).await?;

        Ok(ExecReport {
            exit_code: inspect.exit_code.unwrap_or(-1),
            stdout,
            stderr,
        })
    }

    // ---- images ----

    pub async fn list_images(
        &self,
        filters: HashMap<String, Vec<String>>,
        deadline: Duration,
    ) -> Result<Vec<ImageSummary>, Error> {
        let opts = ListImagesOptions {
            all: false,
            filters,
            ..Default::default()
        };

        let images = with_deadline(deadline, self.docker.list_images(Some(opts))).await?;

        Ok(images
            .into_iter()
            .map(|i| ImageSummary {
                id: i.id,
                repo_tags: i.repo_tags,
                size: i.size,
                created: i.created,
            })
            .collect())
    }

    pub async fn pull_image(
        &self,
        reference: &str,
        auth: Option<RegistryAuth>,
        deadline: Duration,
    ) -> Result<PullReport, Error> {
        let (from_image, tag) = reference.rsplit_once(':').unwrap_or((reference, "latest"));

        let opts = CreateImageOptions {
            from_image: from_image.to_string(),
            tag: tag.to_string(),
            ..Default::default()
        };

        let credentials = auth.map(|a| bollard::auth::DockerCredentials {
            username: Some(a.username),
            password: Some(a.password),
            serveraddress: a.server_address,
            ..Default::default()
        });

        let mut stream = self.docker.create_image(Some(opts), None, credentials);
        let mut last_status = String::new();
        let mut digest = None;

        let collect = async {
            while let Some(progress) = stream.next().await {
                let info = progress?;
                if let Some(status) = info.status {
                    last_status = status;
                }
                if let Some(d) = info.id {
                    if d.starts_with("sha256:") {
                        digest = Some(d);
                    }
                }
            }
            Ok(())
        };

        tokio::time::timeout(deadline, collect)
            .await
            .map_err(|_| Error::Timeout(deadline))?
            .map_err(Error::from_bollard)?;

        Ok(PullReport {
            reference: reference.to_string(),
            status: last_status,
            digest,
        })
    }

    // ---- services (swarm) ----

    pub async fn list_services(
        &self,
        filters: HashMap<String, Vec<String>>,
        deadline: Duration,
    ) -> Result<Vec<ServiceSummary>, Error> {
        let opts = ListServicesOptions {
            filters,
            ..Default::default()
        };

        let services = with_deadline(deadline, self.docker.list_services(Some(opts))).await?;

        Ok(services.into_iter().map(service_to_summary).collect())
    }

    pub async fn service_scale(
        &self,
        id_or_name: &str,
        replicas: u64,
        deadline: Duration,
    ) -> Result<(), Error> {
        let current = with_deadline(deadline, self.docker.inspect_service(id_or_name, None)).await?;
        let version = current.version.and_then(|v| v.index).unwrap_or(0);
        let mut spec = current.spec.unwrap_or_default();

        if let Some(mode) = spec.mode.as_mut() {
            if let Some(replicated) = mode.replicated.as_mut() {
                replicated.replicas = Some(replicas);
            }
        }

        let opts = UpdateServiceOptions {
            version,
            ..Default::default()
        };

        with_deadline(
            deadline,
            self.docker.update_service(id_or_name, spec, opts, None),
        )
        .await?;

        Ok(())
    }

    pub async fn service_update(
        &self,
        id_or_name: &str,
        patch: ServiceSpecPatch,
        deadline: Duration,
    ) -> Result<(), Error> {
        let current = with_deadline(deadline, self.docker.inspect_service(id_or_name, None)).await?;
        let version = current.version.and_then(|v| v.index).unwrap_or(0);
        let mut spec: ServiceSpec = current.spec.unwrap_or_default();

        if let Some(task_template) = spec.task_template.as_mut() {
            if let Some(container_spec) = task_template.container_spec.as_mut() {
                if let Some(image) = patch.image {
                    container_spec.image = Some(image);
                }
                if let Some(env) = patch.env {
                    container_spec.env = Some(env);
                }
            }
        }
        if let Some(labels) = patch.labels {
            spec.labels = Some(labels);
        }
        if let (Some(replicas), Some(mode)) = (patch.replicas, spec.mode.as_mut()) {
            if let Some(replicated) = mode.replicated.as_mut() {
                replicated.replicas = Some(replicas);
            }
        }

        let opts = UpdateServiceOptions {
            version,
            ..Default::default()
        };

        with_deadline(
            deadline,
            self.docker.update_service(id_or_name, spec, opts, None),
        )
        .await?;

        Ok(())
    }

    // ---- nodes (swarm) ----

    pub async fn list_nodes(&self, deadline: Duration) -> Result<Vec<NodeSummary>, Error> {
        let nodes = with_deadline(deadline, self.docker.list_nodes(None::<ListNodesOptions<String>>)).await?;

        Ok(nodes
            .into_iter()
            .map(|n| {
                let spec = n.spec.unwrap_or_default();
                let status = n.status.unwrap_or_default();
                let manager = n.manager_status.clone();
                NodeSummary {
                    id: n.id.unwrap_or_default(),
                    hostname: n
                        .description
                        .and_then(|d| d.hostname)
                        .unwrap_or_default(),
                    role: spec
                        .role
                        .map(|r| format!("{:?}", r).to_lowercase())
                        .unwrap_or_default(),
                    availability: spec
                        .availability
                        .map(|a| format!("{:?}", a).to_lowercase())
                        .unwrap_or_default(),
                    status: status
                        .state
                        .map(|s| format!("{:?}", s).to_lowercase())
                        .unwrap_or_default(),
                    is_leader: manager.and_then(|m| m.leader).unwrap_or(false),
                }
            })
            .collect())
    }

    pub async fn node_tasks(
        &self,
        node_id: &str,
        deadline: Duration,
    ) -> Result<Vec<TaskSummary>, Error> {
        let mut filters = HashMap::new();
        filters.insert("node".to_string(), vec![node_id.to_string()]);

        let opts = bollard::task::ListTasksOptions { filters };
        let tasks = with_deadline(deadline, self.docker.list_tasks(Some(opts))).await?;

        Ok(tasks
            .into_iter()
            .map(|t| TaskSummary {
                id: t.id.unwrap_or_default(),
                service_id: t.service_id.unwrap_or_default(),
                node_id: t.node_id.unwrap_or_default(),
                state: t
                    .status
                    .as_ref()
                    .and_then(|s| s.state)
                    .map(|s| format!("{:?}", s).to_lowercase())
                    .unwrap_or_default(),
                desired_state: t
                    .desired_state
                    .map(|s| format!("{:?}", s).to_lowercase())
                    .unwrap_or_default(),
                message: t
                    .status
                    .and_then(|s| s.message)
                    .unwrap_or_default(),
            })
            .collect())
    }

    /// Per-target primitive the Concurrency Coordinator fans out over for
    /// swarm-wide stat collection.
    pub async fn node_stats(&self, node_id: &str, deadline: Duration) -> Result<NodeStats, Error> {
        let tasks = self.node_tasks(node_id, deadline).await?;
        let running = tasks.iter().filter(|t| t.state == "running").count() as u64;

        Ok(NodeStats {
            node_id: node_id.to_string(),
            cpu_percent: 0.0,
            memory_used_bytes: 0,
            memory_limit_bytes: 0,
            task_count: running,
        })
    }

    // ---- stacks ----

    pub async fn deploy_stack(
        &self,
        name: &str,
        compose: ComposeDocument,
        deadline: Duration,
    ) -> Result<DeployReport, Error> {
        let mut created = Vec::new();
        let mut updated = Vec::new();

        for (service_name, spec) in compose.services {
            let full_name = format!("{}_{}", name, service_name);
            let mut labels = spec.labels.clone();
            labels.insert("com.docker.stack.namespace".to_string(), name.to_string());

            let existing = self.docker.inspect_service(&full_name, None).await;

            match existing {
                Ok(current) => {
                    let version = current.version.and_then(|v| v.index).unwrap_or(0);
                    let mut service_spec = current.spec.unwrap_or_default();
                    if let Some(task_template) = service_spec.task_template.as_mut() {
                        if let Some(container_spec) = task_template.container_spec.as_mut() {
                            container_spec.image = Some(spec.image.clone());
                            container_spec.env = Some(spec.environment.clone());
                        }
                    }
                    with_deadline(
                        deadline,
                        self.docker.update_service(
                            &full_name,
                            service_spec,
                            UpdateServiceOptions { version, ..Default::default() },
                            None,
                        ),
                    )
                    .await?;
                    updated.push(full_name);
                }
                Err(bollard::errors::Error::DockerResponseServerError { status_code: 404, .. }) => {
                    let service_spec = build_service_spec(&full_name, &spec, labels);
                    with_deadline(deadline, self.docker.create_service(service_spec, None)).await?;
                    created.push(full_name);
                }
                Err(err) => return Err(Error::from_bollard(err)),
            }
        }

        Ok(DeployReport {
            stack_name: name.to_string(),
            services_created: created,
            services_updated: updated,
        })
    }

    pub async fn remove_stack(&self, name: &str, deadline: Duration) -> Result<(), Error> {
        let mut filters = HashMap::new();
        filters.insert(
            "label".to_string(),
            vec![format!("com.docker.stack.namespace={}", name)],
        );

        let services = with_deadline(
            deadline,
            self.docker.list_services(Some(ListServicesOptions {
                filters,
                ..Default::default()
            })),
        )
        .await?;

        for service in services {
            if let Some(id) = service.id {
                with_deadline(deadline, self.docker.delete_service(&id)).await?;
            }
        }

        Ok(())
    }

    // ---- networks / volumes / secrets / configs ----

    pub async fn list_networks(
        &self,
        filters: HashMap<String, Vec<String>>,
        deadline: Duration,
    ) -> Result<Vec<NetworkSummary>, Error> {
        let opts = ListNetworksOptions { filters };
        let networks = with_deadline(deadline, self.docker.list_networks(Some(opts))).await?;

        Ok(networks
            .into_iter()
            .map(|n| NetworkSummary {
                id: n.id.unwrap_or_default(),
                name: n.name.unwrap_or_default(),
                driver: n.driver.unwrap_or_default(),
                scope: n.scope.unwrap_or_default(),
            })
            .collect())
    }

    pub async fn create_network(
        &self,
        name: &str,
        driver: &str,
        deadline: Duration,
    ) -> Result<String, Error> {
        let opts = CreateNetworkOptions {
            name: name.to_string(),
            driver: driver.to_string(),
            ..Default::default()
        };
        let resp = with_deadline(deadline, self.docker.create_network(opts)).await?;
        Ok(resp.id)
    }

    pub async fn remove_network(&self, id_or_name: &str, deadline: Duration) -> Result<(), Error> {
        with_deadline(deadline, self.docker.remove_network(id_or_name)).await
    }

    pub async fn list_volumes(
        &self,
        filters: HashMap<String, Vec<String>>,
        deadline: Duration,
    ) -> Result<Vec<VolumeSummary>, Error> {
        let opts = ListVolumesOptions { filters };
        let resp = with_deadline(deadline, self.docker.list_volumes(Some(opts))).await?;

        Ok(resp
            .volumes
            .unwrap_or_default()
            .into_iter()
            .map(|v| VolumeSummary {
                name: v.name,
                driver: v.driver,
                mountpoint: v.mountpoint,
            })
            .collect())
    }

    pub async fn create_volume(&self, name: &str, driver: &str, deadline: Duration) -> Result<(), Error> {
        let opts = CreateVolumeOptions {
            name: name.to_string(),
            driver: driver.to_string(),
            ..Default::default()
        };
        with_deadline(deadline, self.docker.create_volume(opts)).await?;
        Ok(())
    }

    pub async fn remove_volume(&self, name: &str, deadline: Duration) -> Result<(), Error> {
        with_deadline(deadline, self.docker.remove_volume(name, None)).await
    }

    pub async fn list_secrets(&self, deadline: Duration) -> Result<Vec<SecretSummary>, Error> {
        let secrets = with_deadline(deadline, self.docker.list_secrets::<String>(None)).await?;
        Ok(secrets
            .into_iter()
            .map(|s| SecretSummary {
                id: s.id.unwrap_or_default(),
                name: s.spec.and_then(|sp| sp.name).unwrap_or_default(),
            })
            .collect())
    }

    pub async fn create_secret(&self, name: &str, data: &[u8], deadline: Duration) -> Result<String, Error> {
        use base64::Engine;
        let spec = bollard::secret::SecretSpec {
            name: Some(name.to_string()),
            data: Some(base64::engine::general_purpose::STANDARD.encode(data)),
            ..Default::default()
        };
        let resp = with_deadline(deadline, self.docker.create_secret(spec)).await?;
        Ok(resp.id.unwrap_or_default())
    }

    pub async fn remove_secret(&self, id_or_name: &str, deadline: Duration) -> Result<(), Error> {
        with_deadline(deadline, self.docker.delete_secret(id_or_name)).await
    }

    pub async fn list_configs(&self, deadline: Duration) -> Result<Vec<ConfigSummary>, Error> {
        let configs = with_deadline(deadline, self.docker.list_configs::<String>(None)).await?;
        Ok(configs
            .into_iter()
            .map(|c| ConfigSummary {
                id: c.id.unwrap_or_default(),
                name: c.spec.and_then(|sp| sp.name).unwrap_or_default(),
            })
            .collect())
    }

    pub async fn remove_config(&self, id_or_name: &str, deadline: Duration) -> Result<(), Error> {
        with_deadline(deadline, self.docker.delete_config(id_or_name)).await
    }

    // ---- events ----

    pub async fn events(
        &self,
        filters: EventFilters,
        deadline: Duration,
    ) -> Result<Vec<DockerEvent>, Error> {
        let mut raw_filters: HashMap<String, Vec<String>> = HashMap::new();
        if let Some(event_type) = filters.event_type {
            raw_filters.insert("type".to_string(), vec![event_type]);
        }
        for (k, v) in filters.labels {
            raw_filters
                .entry("label".to_string())
                .or_default()
                .push(format!("{}={}", k, v));
        }

        let opts = EventsOptions::<String> {
            filters: raw_filters,
            ..Default::default()
        };

        let mut stream = self.docker.events(Some(opts));
        let mut events = Vec::new();

        let collect = async {
            while let Some(msg) = stream.next().await {
                let event = msg?;
                events.push(DockerEvent {
                    kind: event
                        .typ
                        .map(|t| format!("{:?}", t).to_lowercase())
                        .unwrap_or_default(),
                    action: event.action.unwrap_or_default(),
                    actor_id: event.actor.and_then(|a| a.id).unwrap_or_default(),
                    time: event.time.unwrap_or(0),
                });
            }
            Ok(())
        };

        match tokio::time::timeout(deadline, collect).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => return Err(Error::from_bollard(err)),
            Err(_) => warn!("events stream did not close before the deadline; returning what was collected"),
        }

        Ok(events)
    }
}

fn service_to_summary(service: bollard::models::Service) -> ServiceSummary {
    let spec = service.spec.unwrap_or_default();
    let image = spec
        .task_template
        .as_ref()
        .and_then(|t| t.container_spec.as_ref())
        .and_then(|c| c.image.clone())
        .unwrap_or_default();

    let replicas_desired = spec
        .mode
        .as_ref()
        .and_then(|m| m.replicated.as_ref())
        .and_then(|r| r.replicas);

    let replicas_running = service
        .service_status
        .as_ref()
        .and_then(|s| s.running_tasks);

    ServiceSummary {
        id: service.id.unwrap_or_default(),
        name: spec.name.unwrap_or_default(),
        image,
        replicas_desired,
        replicas_running,
        labels: spec.labels.unwrap_or_default(),
    }
}

fn build_service_spec(
    full_name: &str,
    spec: &ComposeService,
    labels: HashMap<String, String>,
) -> ServiceSpec {
    use bollard::secret::{
        ContainerSpec, EndpointSpec, ServiceSpecMode, ServiceSpecModeReplicated, TaskSpec,
    };

    ServiceSpec {
        name: Some(full_name.to_string()),
        labels: Some(labels),
        task_template: Some(TaskSpec {
            container_spec: Some(ContainerSpec {
                image: Some(spec.image.clone()),
                env: Some(spec.environment.clone()),
                ..Default::default()
            }),
            ..Default::default()
        }),
        mode: Some(ServiceSpecMode {
            replicated: Some(ServiceSpecModeReplicated {
                replicas: spec.replicas.or(Some(1)),
            }),
            ..Default::default()
        }),
        endpoint_spec: Some(EndpointSpec::default()),
        ..Default::default()
    }
}
