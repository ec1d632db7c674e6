//! Route gatekeeper decision core.
//!
//! This module is pure: it maps a request path and an optional caller to an
//! [`Access`] decision. The HTTP middleware in `api-rest` is a thin shim over
//! [`RouteTable::decide`], and per-handler checks consult the same
//! [`authorize`] capability, so the two layers cannot drift apart.

use std::collections::{BTreeMap, BTreeSet};

use crate::roles::Group;
use crate::session::Principal;

/// What to do when the gatekeeper itself cannot resolve a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GateFailurePolicy {
    /// Resolution errors let the request through. Matches the behaviour the
    /// service has always had; the denial still depends on the handler layer.
    #[default]
    FailOpen,
    /// Resolution errors deny the request.
    FailClosed,
}

/// What to do with a registered namespace that has no configured required
/// group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnmappedNamespacePolicy {
    /// Unmapped namespaces are open. An explicit choice, not a fallback.
    #[default]
    Open,
    /// Unmapped namespaces still require an authenticated caller.
    RequireLogin,
}

/// A request path resolved against the route table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRoute {
    /// Route name, e.g. `login` or `gestion_personas`.
    pub name: String,
    /// URL namespace (first path segment of namespaced apps), if any.
    pub namespace: Option<String>,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RouteResolutionError {
    #[error("request path must start with '/': '{0}'")]
    NotRooted(String),
    #[error("request path contains an interior NUL byte")]
    EmbeddedNul,
}

/// Outcome of a gate evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    /// Path does not resolve to a known route; defer to the router's 404.
    PassThrough,
    Allowed,
    /// Unauthenticated caller on a gated route. `next` carries the original
    /// path so login can return the user where they were headed.
    RedirectToLogin { next: String },
    Denied(Denial),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Denial {
    pub namespace: String,
    /// `None` when the denial came from a resolution failure under
    /// [`GateFailurePolicy::FailClosed`].
    pub required: Option<Group>,
}

/// Single authorization capability shared by the middleware and handlers.
///
/// Superusers and Administrador members bypass the group requirement.
pub fn authorize(principal: &Principal, required: Group) -> bool {
    principal.superuser
        || principal.groups.contains(&Group::Administrador)
        || principal.groups.contains(&required)
}

/// Static namespace and allow-list table, read-only per request.
///
/// Registered namespaces are the URL prefixes the service knows about;
/// `namespace_groups` maps a subset of them to a required group. The gap
/// between the two is governed by [`UnmappedNamespacePolicy`].
#[derive(Debug, Clone)]
pub struct RouteTable {
    known_namespaces: BTreeSet<String>,
    namespace_groups: BTreeMap<String, Group>,
    public_routes: BTreeSet<String>,
    unmapped_policy: UnmappedNamespacePolicy,
    failure_policy: GateFailurePolicy,
}

impl RouteTable {
    pub fn new(
        known_namespaces: BTreeSet<String>,
        namespace_groups: BTreeMap<String, Group>,
        public_routes: BTreeSet<String>,
        unmapped_policy: UnmappedNamespacePolicy,
        failure_policy: GateFailurePolicy,
    ) -> Self {
        Self {
            known_namespaces,
            namespace_groups,
            public_routes,
            unmapped_policy,
            failure_policy,
        }
    }

    /// The built-in table: one namespace per clinical group plus the public
    /// route names that must stay reachable without authentication.
    pub fn builtin(
        unmapped_policy: UnmappedNamespacePolicy,
        failure_policy: GateFailurePolicy,
    ) -> Self {
        let namespace_groups = BTreeMap::from([
            ("gestion".to_string(), Group::Administrador),
            ("medico".to_string(), Group::Medico),
            ("matrona".to_string(), Group::Matrona),
            ("tens".to_string(), Group::Tens),
        ]);
        let known_namespaces = namespace_groups.keys().cloned().collect();
        let public_routes = [
            "login",
            "logout",
            "password_reset",
            "password_reset_done",
            "password_reset_confirm",
            "password_reset_complete",
            "home",
            "health",
        ]
        .into_iter()
        .map(str::to_string)
        .collect();
        Self::new(
            known_namespaces,
            namespace_groups,
            public_routes,
            unmapped_policy,
            failure_policy,
        )
    }

    pub fn required_group(&self, namespace: &str) -> Option<Group> {
        self.namespace_groups.get(namespace).copied()
    }

    pub fn is_public(&self, route_name: &str) -> bool {
        self.public_routes.contains(route_name)
    }

    /// Resolves a request path to a route name and namespace.
    ///
    /// Returns `Ok(None)` for paths that do not belong to any known route.
    pub fn resolve(&self, path: &str) -> Result<Option<ResolvedRoute>, RouteResolutionError> {
        if !path.starts_with('/') {
            return Err(RouteResolutionError::NotRooted(path.to_owned()));
        }
        if path.contains('\0') {
            return Err(RouteResolutionError::EmbeddedNul);
        }

        let trimmed = path.trim_end_matches('/');
        let named = |name: &str| {
            Ok(Some(ResolvedRoute {
                name: name.to_owned(),
                namespace: None,
            }))
        };
        match trimmed {
            "" => return named("home"),
            "/login" => return named("login"),
            "/logout" => return named("logout"),
            "/health" => return named("health"),
            "/verify" => return named("verify"),
            "/password-reset" => return named("password_reset"),
            "/password-reset/done" => return named("password_reset_done"),
            "/password-reset/confirm" => return named("password_reset_confirm"),
            "/password-reset/complete" => return named("password_reset_complete"),
            _ => {}
        }

        let mut segments = trimmed.trim_start_matches('/').split('/');
        let first = segments.next().unwrap_or("");
        if first == "dashboard" {
            return match segments.next() {
                Some(role) if !role.is_empty() => Ok(Some(ResolvedRoute {
                    name: format!("dashboard_{role}"),
                    namespace: None,
                })),
                _ => Ok(None),
            };
        }
        if self.known_namespaces.contains(first) {
            let suffix = segments.next().filter(|s| !s.is_empty()).unwrap_or("index");
            return Ok(Some(ResolvedRoute {
                name: format!("{first}_{suffix}"),
                namespace: Some(first.to_owned()),
            }));
        }

        Ok(None)
    }

    /// Evaluates the gate for one request. Emits exactly one audit entry per
    /// denial.
    pub fn decide(&self, caller: Option<&Principal>, path: &str) -> Access {
        let resolved = match self.resolve(path) {
            Ok(resolved) => resolved,
            Err(err) => {
                return match self.failure_policy {
                    GateFailurePolicy::FailOpen => {
                        tracing::warn!(path, error = %err, "route resolution failed, gate passing request through");
                        Access::Allowed
                    }
                    GateFailurePolicy::FailClosed => {
                        tracing::warn!(path, error = %err, "route resolution failed, gate denying request");
                        Access::Denied(Denial {
                            namespace: "unresolved".to_owned(),
                            required: None,
                        })
                    }
                };
            }
        };

        let route = match resolved {
            Some(route) => route,
            None => return Access::PassThrough,
        };

        if self.is_public(&route.name) {
            return Access::Allowed;
        }

        let namespace = match route.namespace {
            Some(namespace) => namespace,
            None => return Access::Allowed,
        };

        let required = match self.required_group(&namespace) {
            Some(group) => group,
            None => match self.unmapped_policy {
                UnmappedNamespacePolicy::Open => return Access::Allowed,
                UnmappedNamespacePolicy::RequireLogin => {
                    return match caller {
                        Some(_) => Access::Allowed,
                        None => Access::RedirectToLogin {
                            next: path.to_owned(),
                        },
                    };
                }
            },
        };

        let principal = match caller {
            Some(principal) => principal,
            None => {
                return Access::RedirectToLogin {
                    next: path.to_owned(),
                };
            }
        };

        if authorize(principal, required) {
            Access::Allowed
        } else {
            tracing::warn!(
                user = %principal.username,
                namespace = %namespace,
                required_group = %required,
                "access denied by route gatekeeper"
            );
            Access::Denied(Denial {
                namespace,
                required: Some(required),
            })
        }
    }
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::builtin(
            UnmappedNamespacePolicy::default(),
            GateFailurePolicy::default(),
        )
    }
}
